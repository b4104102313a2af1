//! Android system properties access

use jni::objects::{JObject, JString};
use jni::JNIEnv;

use crate::descriptor::PlatformDescriptor;

const BUILD_VERSION_CLASS: &str = "android/os/Build$VERSION";

/// `Build.VERSION.SDK_INT` and `Build.VERSION.RELEASE`
pub fn read_descriptor(
    env: &mut JNIEnv,
    _context: &JObject,
) -> jni::errors::Result<PlatformDescriptor> {
    let api_level = env.get_static_field(BUILD_VERSION_CLASS, "SDK_INT", "I")?.i()?;
    let release = env
        .get_static_field(BUILD_VERSION_CLASS, "RELEASE", "Ljava/lang/String;")?
        .l()?;
    let release = JString::from(release);
    let release: String = env.get_string(&release)?.into();

    Ok(PlatformDescriptor::new(api_level.max(0) as u32, release))
}

/// `context.getPackageManager().hasSystemFeature(feature)`
pub fn has_system_feature(
    env: &mut JNIEnv,
    context: &JObject,
    feature: &str,
) -> jni::errors::Result<bool> {
    let package_manager = env
        .call_method(context, "getPackageManager", "()Landroid/content/pm/PackageManager;", &[])?
        .l()?;
    let name = env.new_string(feature)?;
    let present = env
        .call_method(
            &package_manager,
            "hasSystemFeature",
            "(Ljava/lang/String;)Z",
            &[(&name).into()],
        )?
        .z()?;
    env.delete_local_ref(name)?;
    env.delete_local_ref(package_manager)?;
    Ok(present)
}
