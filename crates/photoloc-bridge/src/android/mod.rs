// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each trait method invokes the corresponding
// Android API through JNI calls into the ART runtime.
//
// ## Host contract
//
// Content resolver, media store, permission, package manager and intent
// calls are made directly. Toasts and web view scripts must run on the UI
// thread, which JNI cannot post to without a Runnable, so the hosting
// Activity exposes two methods that do the hop itself:
//
//     fun showToast(message: String, long: Boolean)
//     fun evaluateJavascriptOnUiThread(script: String)

#![cfg(target_os = "android")]

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::OnceLock;

use jni::JNIEnv;
use jni::JavaVM;
use jni::objects::{GlobalRef, JByteArray, JObject, JObjectArray, JString, JValue};

use photoloc_core::error::{PhotolocError, Result};
use photoloc_core::types::GalleryHandle;

use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// `MediaStore.MediaColumns.DATA`.
const DATA_COLUMN: &str = "_data";

const ACTION_VIEW: &str = "android.intent.action.VIEW";
const CATEGORY_DEFAULT: &str = "android.intent.category.DEFAULT";

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: i32 = 0;

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

fn java_vm() -> Result<&'static JavaVM> {
    if let Some(vm) = JAVA_VM.get() {
        return Ok(vm);
    }
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| PhotolocError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    Ok(JAVA_VM.get_or_init(|| vm))
}

/// Obtain a [`JNIEnv`] for the current thread, attaching it if needed.
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| PhotolocError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Obtain the hosting `Activity` as a [`JObject`].
fn activity() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(PhotolocError::Bridge(
            "Android context is null, activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Map any `jni::errors::Error` into `PhotolocError::Bridge`, clearing a
/// pending Java exception so the next call on this thread is legal.
fn jni_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> PhotolocError {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    PhotolocError::Bridge(format!("{context}: {e}"))
}

fn parse_uri<'a>(env: &mut JNIEnv<'a>, uri: &str) -> Result<JObject<'a>> {
    let j_uri = env
        .new_string(uri)
        .map_err(|e| jni_err(env, "new_string(uri)", e))?;
    let parsed = env
        .call_static_method(
            "android/net/Uri",
            "parse",
            "(Ljava/lang/String;)Landroid/net/Uri;",
            &[JValue::Object(&j_uri)],
        )
        .and_then(|v| v.l());
    parsed.map_err(|e| jni_err(env, "Uri.parse", e))
}

fn content_resolver<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    let resolver = env
        .call_method(
            activity,
            "getContentResolver",
            "()Landroid/content/ContentResolver;",
            &[],
        )
        .and_then(|v| v.l());
    resolver.map_err(|e| jni_err(env, "getContentResolver", e))
}

fn package_manager<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    let pm = env
        .call_method(
            activity,
            "getPackageManager",
            "()Landroid/content/pm/PackageManager;",
            &[],
        )
        .and_then(|v| v.l());
    pm.map_err(|e| jni_err(env, "getPackageManager", e))
}

fn string_array<'a>(env: &mut JNIEnv<'a>, values: &[&str]) -> Result<JObjectArray<'a>> {
    let array = env
        .new_object_array(values.len() as i32, "java/lang/String", JObject::null())
        .map_err(|e| jni_err(env, "new_object_array", e))?;
    for (index, value) in values.iter().enumerate() {
        let j_value = env
            .new_string(value)
            .map_err(|e| jni_err(env, "new_string(array element)", e))?;
        env.set_object_array_element(&array, index as i32, &j_value)
            .map_err(|e| jni_err(env, "set_object_array_element", e))?;
    }
    Ok(array)
}

fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let j_str = JString::from(obj);
    let value: String = env
        .get_string(&j_str)
        .map_err(|e| jni_err(env, "get_string", e))?
        .into();
    Ok(Some(value))
}

/// `new Intent(ACTION_VIEW, Uri.parse(uri))` with `CATEGORY_DEFAULT`.
fn view_intent<'a>(env: &mut JNIEnv<'a>, uri: &str) -> Result<JObject<'a>> {
    let uri_obj = parse_uri(env, uri)?;
    let j_action = env
        .new_string(ACTION_VIEW)
        .map_err(|e| jni_err(env, "new_string(action)", e))?;
    let intent = env
        .new_object(
            "android/content/Intent",
            "(Ljava/lang/String;Landroid/net/Uri;)V",
            &[JValue::Object(&j_action), JValue::Object(&uri_obj)],
        )
        .map_err(|e| jni_err(env, "new Intent", e))?;
    let j_category = env
        .new_string(CATEGORY_DEFAULT)
        .map_err(|e| jni_err(env, "new_string(category)", e))?;
    env.call_method(
        &intent,
        "addCategory",
        "(Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&j_category)],
    )
    .map_err(|e| jni_err(env, "Intent.addCategory", e))?;
    Ok(intent)
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the Photoloc platform bridge.
///
/// Zero-sized; all state lives on the Java side.
pub struct AndroidBridge;

impl AndroidBridge {
    /// Create a new Android bridge.
    ///
    /// This does **not** touch JNI; the first JNI call happens lazily when
    /// a trait method is invoked.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }

    /// `Build.VERSION.SDK_INT`. Falls back to 0 (oldest permission model)
    /// if the field cannot be read.
    fn sdk_level(&self) -> u32 {
        let level = jni_env().and_then(|mut env| {
            let value = env
                .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
                .and_then(|v| v.i());
            value.map_err(|e| jni_err(&mut env, "Build.VERSION.SDK_INT", e))
        });
        match level {
            Ok(level) => level.max(0) as u32,
            Err(e) => {
                tracing::error!(error = %e, "could not read SDK level");
                0
            }
        }
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let dir = env
            .call_method(&activity, "getCacheDir", "()Ljava/io/File;", &[])
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "getCacheDir", e))?;
        let path = env
            .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "File.getAbsolutePath", e))?;
        java_string(&mut env, path)?
            .map(PathBuf::from)
            .ok_or_else(|| PhotolocError::Bridge("cache dir path is null".into()))
    }
}

// ---------------------------------------------------------------------------
// NativeContentResolver: android.content.ContentResolver
// ---------------------------------------------------------------------------

impl NativeContentResolver for AndroidBridge {
    /// `resolver.query(uri, ["_data"], selection, args, null)` and read
    /// the first row. The cursor is closed on every path.
    fn query_data_path(
        &self,
        uri: &str,
        selection: Option<&RowSelection>,
    ) -> Result<Option<String>> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(uri, ?selection, "Android: querying _data column");

        let resolver = content_resolver(&mut env, &activity)?;
        let uri_obj = parse_uri(&mut env, uri)?;
        let projection = string_array(&mut env, &[DATA_COLUMN])?;

        let (selection_obj, args_obj): (JObject, JObject) = match selection {
            Some(sel) => {
                let clause = env
                    .new_string(format!("{}=?", sel.column))
                    .map_err(|e| jni_err(&mut env, "new_string(selection)", e))?;
                let args = string_array(&mut env, &[sel.value.as_str()])?;
                (clause.into(), args.into())
            }
            None => (JObject::null(), JObject::null()),
        };

        let cursor = env
            .call_method(
                &resolver,
                "query",
                "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
                &[
                    JValue::Object(&uri_obj),
                    JValue::Object(&projection),
                    JValue::Object(&selection_obj),
                    JValue::Object(&args_obj),
                    JValue::Object(&JObject::null()),
                ],
            )
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "ContentResolver.query", e))?;

        if cursor.is_null() {
            return Ok(None);
        }

        let path = read_first_data_path(&mut env, &cursor);

        env.call_method(&cursor, "close", "()V", &[])
            .map_err(|e| jni_err(&mut env, "Cursor.close", e))?;

        let path = path?.filter(|p| !p.is_empty());
        tracing::info!(uri, ?path, "Android: _data query finished");
        Ok(path)
    }

    /// Open `ContentResolver.openInputStream`; bytes are read lazily.
    fn open_input_stream(&self, uri: &str) -> Result<Box<dyn Read + Send>> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(uri, "Android: opening input stream");

        let resolver = content_resolver(&mut env, &activity)?;
        let uri_obj = parse_uri(&mut env, uri)?;

        let input_stream = env
            .call_method(
                &resolver,
                "openInputStream",
                "(Landroid/net/Uri;)Ljava/io/InputStream;",
                &[JValue::Object(&uri_obj)],
            )
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "openInputStream", e))?;

        if input_stream.is_null() {
            return Err(PhotolocError::Bridge(format!(
                "ContentResolver returned null InputStream for URI: {uri}"
            )));
        }

        let stream = env
            .new_global_ref(&input_stream)
            .map_err(|e| jni_err(&mut env, "new_global_ref(InputStream)", e))?;
        let chunk = env
            .new_byte_array(READ_CHUNK as i32)
            .map_err(|e| jni_err(&mut env, "new_byte_array(chunk)", e))?;
        let chunk = env
            .new_global_ref(&chunk)
            .map_err(|e| jni_err(&mut env, "new_global_ref(chunk)", e))?;

        Ok(Box::new(JavaInputStream {
            uri: uri.to_string(),
            stream,
            chunk,
            total: 0,
            eof: false,
        }))
    }
}

/// JNI read buffer size.
const READ_CHUNK: usize = 8192;

/// `java.io.InputStream` pulled through JNI one chunk per `read`, so callers
/// bound memory with `take`. Closed on drop.
struct JavaInputStream {
    uri: String,
    stream: GlobalRef,
    chunk: GlobalRef,
    total: u64,
    eof: bool,
}

impl Read for JavaInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.eof || buf.is_empty() {
            return Ok(0);
        }
        let mut env = jni_env().map_err(io::Error::other)?;
        let chunk: &JByteArray<'_> = self.chunk.as_obj().into();
        let want = buf.len().min(READ_CHUNK) as i32;

        let read = env
            .call_method(
                self.stream.as_obj(),
                "read",
                "([BII)I",
                &[JValue::Object(chunk), JValue::Int(0), JValue::Int(want)],
            )
            .and_then(|v| v.i())
            .map_err(|e| io::Error::other(jni_err(&mut env, "InputStream.read", e)))?;
        let Ok(read) = usize::try_from(read) else {
            // -1: end of stream
            self.eof = true;
            tracing::info!(uri = %self.uri, bytes = self.total, "Android: input stream read");
            return Ok(0);
        };

        let mut signed = [0i8; READ_CHUNK];
        env.get_byte_array_region(chunk, 0, &mut signed[..read])
            .map_err(|e| io::Error::other(jni_err(&mut env, "get_byte_array_region", e)))?;
        for (dst, src) in buf.iter_mut().zip(&signed[..read]) {
            *dst = *src as u8;
        }
        self.total += read as u64;
        Ok(read)
    }
}

impl Drop for JavaInputStream {
    fn drop(&mut self) {
        let closed = jni_env().and_then(|mut env| {
            env.call_method(self.stream.as_obj(), "close", "()V", &[])
                .map(|_| ())
                .map_err(|e| jni_err(&mut env, "InputStream.close", e))
        });
        if let Err(e) = closed {
            tracing::warn!(uri = %self.uri, error = %e, "Android: input stream close failed");
        }
    }
}

fn read_first_data_path(env: &mut JNIEnv<'_>, cursor: &JObject<'_>) -> Result<Option<String>> {
    let has_row = env
        .call_method(cursor, "moveToFirst", "()Z", &[])
        .and_then(|v| v.z())
        .map_err(|e| jni_err(env, "Cursor.moveToFirst", e))?;
    if !has_row {
        return Ok(None);
    }

    let j_column = env
        .new_string(DATA_COLUMN)
        .map_err(|e| jni_err(env, "new_string(column)", e))?;
    let index = env
        .call_method(
            cursor,
            "getColumnIndex",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&j_column)],
        )
        .and_then(|v| v.i())
        .map_err(|e| jni_err(env, "Cursor.getColumnIndex", e))?;
    if index < 0 {
        return Ok(None);
    }

    let value = env
        .call_method(
            cursor,
            "getString",
            "(I)Ljava/lang/String;",
            &[JValue::Int(index)],
        )
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "Cursor.getString", e))?;
    java_string(env, value)
}

// ---------------------------------------------------------------------------
// NativeGallery: MediaStore.Images.Media.insertImage
// ---------------------------------------------------------------------------

impl NativeGallery for AndroidBridge {
    fn insert_image(&self, image: &GalleryImage<'_>) -> Result<GalleryHandle> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(
            title = image.title,
            mime = image.mime_type,
            bytes = image.bytes.len(),
            "Android: inserting image into MediaStore"
        );

        let data = env
            .byte_array_from_slice(image.bytes)
            .map_err(|e| jni_err(&mut env, "byte_array_from_slice", e))?;

        let bitmap = env
            .call_static_method(
                "android/graphics/BitmapFactory",
                "decodeByteArray",
                "([BII)Landroid/graphics/Bitmap;",
                &[
                    JValue::Object(&data),
                    JValue::Int(0),
                    JValue::Int(image.bytes.len() as i32),
                ],
            )
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "BitmapFactory.decodeByteArray", e))?;

        if bitmap.is_null() {
            return Err(PhotolocError::Image(
                "BitmapFactory could not decode the image".into(),
            ));
        }

        let resolver = content_resolver(&mut env, &activity)?;
        let j_title = env
            .new_string(image.title)
            .map_err(|e| jni_err(&mut env, "new_string(title)", e))?;
        let j_description = env
            .new_string(image.description)
            .map_err(|e| jni_err(&mut env, "new_string(description)", e))?;

        let inserted = env
            .call_static_method(
                "android/provider/MediaStore$Images$Media",
                "insertImage",
                "(Landroid/content/ContentResolver;Landroid/graphics/Bitmap;Ljava/lang/String;Ljava/lang/String;)Ljava/lang/String;",
                &[
                    JValue::Object(&resolver),
                    JValue::Object(&bitmap),
                    JValue::Object(&j_title),
                    JValue::Object(&j_description),
                ],
            )
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "MediaStore.insertImage", e))?;

        let handle = java_string(&mut env, inserted)?
            .ok_or_else(|| PhotolocError::Bridge("MediaStore.insertImage returned null".into()))?;

        tracing::info!(handle = %handle, "Android: image inserted");
        Ok(GalleryHandle(handle))
    }
}

// ---------------------------------------------------------------------------
// NativePermissions: ContextCompat / ActivityCompat
// ---------------------------------------------------------------------------

impl NativePermissions for AndroidBridge {
    fn check_permission(&self, permission: &str) -> bool {
        let granted = (|| -> Result<bool> {
            let mut env = jni_env()?;
            let activity = activity()?;
            let j_permission = env
                .new_string(permission)
                .map_err(|e| jni_err(&mut env, "new_string(permission)", e))?;
            let status = env
                .call_static_method(
                    "androidx/core/content/ContextCompat",
                    "checkSelfPermission",
                    "(Landroid/content/Context;Ljava/lang/String;)I",
                    &[JValue::Object(&activity), JValue::Object(&j_permission)],
                )
                .and_then(|v| v.i())
                .map_err(|e| jni_err(&mut env, "ContextCompat.checkSelfPermission", e))?;
            Ok(status == PERMISSION_GRANTED)
        })();

        match granted {
            Ok(granted) => granted,
            Err(e) => {
                tracing::error!(permission, error = %e, "permission check failed");
                false
            }
        }
    }

    fn request_permissions(&self, permissions: &[&str], request_code: i32) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(?permissions, request_code, "Android: requesting permissions");

        let j_permissions = string_array(&mut env, permissions)?;
        env.call_static_method(
            "androidx/core/app/ActivityCompat",
            "requestPermissions",
            "(Landroid/app/Activity;[Ljava/lang/String;I)V",
            &[
                JValue::Object(&activity),
                JValue::Object(&j_permissions),
                JValue::Int(request_code),
            ],
        )
        .map_err(|e| jni_err(&mut env, "ActivityCompat.requestPermissions", e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NativeIntents: Intent.ACTION_VIEW
// ---------------------------------------------------------------------------

impl NativeIntents for AndroidBridge {
    fn resolves_view_intent(&self, uri: &str) -> Result<bool> {
        let mut env = jni_env()?;
        let activity = activity()?;

        let intent = view_intent(&mut env, uri)?;
        let pm = package_manager(&mut env, &activity)?;
        let component = env
            .call_method(
                &intent,
                "resolveActivity",
                "(Landroid/content/pm/PackageManager;)Landroid/content/ComponentName;",
                &[JValue::Object(&pm)],
            )
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "Intent.resolveActivity", e))?;

        let resolves = !component.is_null();
        tracing::info!(uri, resolves, "Android: view intent resolution");
        Ok(resolves)
    }

    fn start_view_intent(&self, uri: &str) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(uri, "Android: starting view intent");

        let intent = view_intent(&mut env, uri)?;
        env.call_method(
            &activity,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[JValue::Object(&intent)],
        )
        .map_err(|e| jni_err(&mut env, "startActivity(view)", e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NativePackages: PackageManager
// ---------------------------------------------------------------------------

impl NativePackages for AndroidBridge {
    /// `getApplicationInfo(package, 0)` throws `NameNotFoundException`
    /// for missing packages; any failure counts as "not installed".
    fn is_package_installed(&self, package: &str) -> bool {
        let installed = (|| -> Result<()> {
            let mut env = jni_env()?;
            let activity = activity()?;
            let pm = package_manager(&mut env, &activity)?;
            let j_package = env
                .new_string(package)
                .map_err(|e| jni_err(&mut env, "new_string(package)", e))?;
            env.call_method(
                &pm,
                "getApplicationInfo",
                "(Ljava/lang/String;I)Landroid/content/pm/ApplicationInfo;",
                &[JValue::Object(&j_package), JValue::Int(0)],
            )
            .map_err(|e| jni_err(&mut env, "getApplicationInfo", e))?;
            Ok(())
        })();
        installed.is_ok()
    }

    fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let pm = package_manager(&mut env, &activity)?;

        let list = env
            .call_method(
                &pm,
                "getInstalledApplications",
                "(I)Ljava/util/List;",
                &[JValue::Int(0)],
            )
            .and_then(|v| v.l())
            .map_err(|e| jni_err(&mut env, "getInstalledApplications", e))?;

        let size = env
            .call_method(&list, "size", "()I", &[])
            .and_then(|v| v.i())
            .map_err(|e| jni_err(&mut env, "List.size", e))?;

        let mut packages = Vec::with_capacity(size.max(0) as usize);
        for index in 0..size {
            let info = env
                .call_method(&list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(&mut env, "List.get", e))?;

            let name_obj = env
                .get_field(&info, "packageName", "Ljava/lang/String;")
                .and_then(|v| v.l())
                .map_err(|e| jni_err(&mut env, "ApplicationInfo.packageName", e))?;
            let package_name = java_string(&mut env, name_obj)?.unwrap_or_default();

            let label_obj = env
                .call_method(
                    &info,
                    "loadLabel",
                    "(Landroid/content/pm/PackageManager;)Ljava/lang/CharSequence;",
                    &[JValue::Object(&pm)],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(&mut env, "loadLabel", e))?;
            let label_str = env
                .call_method(&label_obj, "toString", "()Ljava/lang/String;", &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(&mut env, "CharSequence.toString", e))?;
            let label = java_string(&mut env, label_str)?.unwrap_or_default();

            // Keep the local reference table small on devices with many apps.
            env.delete_local_ref(label_obj)
                .map_err(|e| jni_err(&mut env, "delete_local_ref", e))?;
            env.delete_local_ref(info)
                .map_err(|e| jni_err(&mut env, "delete_local_ref", e))?;

            packages.push(InstalledPackage {
                package_name,
                label,
            });
        }

        tracing::info!(count = packages.len(), "Android: listed installed packages");
        Ok(packages)
    }
}

// ---------------------------------------------------------------------------
// NativeWebView / NativeToast: host Activity hooks
// ---------------------------------------------------------------------------

impl NativeWebView for AndroidBridge {
    fn evaluate_javascript(&self, script: &str) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let j_script = env
            .new_string(script)
            .map_err(|e| jni_err(&mut env, "new_string(script)", e))?;
        env.call_method(
            &activity,
            "evaluateJavascriptOnUiThread",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_script)],
        )
        .map_err(|e| jni_err(&mut env, "evaluateJavascriptOnUiThread", e))?;
        Ok(())
    }
}

impl NativeToast for AndroidBridge {
    fn show_toast(&self, message: &str, duration: ToastDuration) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let j_message = env
            .new_string(message)
            .map_err(|e| jni_err(&mut env, "new_string(message)", e))?;
        env.call_method(
            &activity,
            "showToast",
            "(Ljava/lang/String;Z)V",
            &[
                JValue::Object(&j_message),
                JValue::Bool((duration == ToastDuration::Long).into()),
            ],
        )
        .map_err(|e| jni_err(&mut env, "showToast", e))?;
        Ok(())
    }
}
