//! `androidx.biometric.BiometricManager` calls

use jni::objects::{JObject, JValue};
use jni::JNIEnv;

const BIOMETRIC_MANAGER_CLASS: &str = "androidx/biometric/BiometricManager";
const FROM_SIG: &str = "(Landroid/content/Context;)Landroidx/biometric/BiometricManager;";

fn biometric_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
) -> jni::errors::Result<JObject<'local>> {
    env.call_static_method(BIOMETRIC_MANAGER_CLASS, "from", FROM_SIG, &[JValue::Object(context)])?
        .l()
}

/// `BiometricManager.from(context).canAuthenticate(authenticators)`
pub fn can_authenticate(
    env: &mut JNIEnv,
    context: &JObject,
    authenticators: i32,
) -> jni::errors::Result<i32> {
    let manager = biometric_manager(env, context)?;
    let code = env
        .call_method(&manager, "canAuthenticate", "(I)I", &[JValue::Int(authenticators)])?
        .i()?;
    env.delete_local_ref(manager)?;
    Ok(code)
}

/// `BiometricManager.from(context).canAuthenticate()`
pub fn can_authenticate_legacy(env: &mut JNIEnv, context: &JObject) -> jni::errors::Result<i32> {
    let manager = biometric_manager(env, context)?;
    let code = env.call_method(&manager, "canAuthenticate", "()I", &[])?.i()?;
    env.delete_local_ref(manager)?;
    Ok(code)
}
