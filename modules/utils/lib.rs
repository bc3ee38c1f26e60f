use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Shared handle to the sandbox root of a scripting instance.
///
/// The native `File` functions capture a clone of this handle when they are
/// attached to a context; `ScriptingInstance::set_safe_path` swaps the root
/// afterwards. No root configured means no disk access for scripts.
#[derive(Clone, Default)]
pub struct SafePath {
    root: Arc<RwLock<Option<PathBuf>>>,
}

impl SafePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, root: PathBuf) {
        if let Ok(mut guard) = self.root.write() {
            *guard = Some(root);
        }
    }

    pub fn get(&self) -> Option<PathBuf> {
        self.root.read().ok().and_then(|guard| guard.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.root.read().is_ok_and(|guard| guard.is_some())
    }
}

/// Error type for operations exposed to scripts
#[derive(Debug)]
pub enum EngineError {
    Io(std::io::Error),
    /// Disk access attempted without a configured safe path
    Denied(String),
    /// A path resolved outside the configured safe path
    Sandbox(String),
    NotSupported(String),
    Other(String),
}

/// Result type alias for operations exposed to scripts
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// JavaScript-compatible result wrapper
pub enum JsResult<T> {
    Ok(T),
    Err { error: String, kind: String },
}

impl<T> From<EngineResult<T>> for JsResult<T> {
    fn from(result: EngineResult<T>) -> Self {
        match result {
            Ok(value) => JsResult::Ok(value),
            Err(e) => JsResult::Err {
                error: e.to_string(),
                kind: e.error_class().to_string(),
            },
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Io(e) => write!(f, "{e}"),
            EngineError::Denied(s)
            | EngineError::Sandbox(s)
            | EngineError::NotSupported(s)
            | EngineError::Other(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e)
    }
}

impl EngineError {
    /// Name of the script-visible error class thrown for this error.
    /// The classes live in `__sandjs__.errors` (see `script_common`).
    pub fn error_class(&self) -> &str {
        match self {
            EngineError::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => "NotFound",
                std::io::ErrorKind::PermissionDenied => "PermissionDenied",
                std::io::ErrorKind::AlreadyExists => "AlreadyExists",
                std::io::ErrorKind::InvalidInput | std::io::ErrorKind::InvalidData => "InvalidData",
                std::io::ErrorKind::TimedOut => "TimedOut",
                std::io::ErrorKind::Interrupted => "Interrupted",
                std::io::ErrorKind::UnexpectedEof => "UnexpectedEof",
                _ => "Other",
            },
            EngineError::Denied(_) => "PermissionDenied",
            EngineError::Sandbox(_) => "SandboxViolation",
            EngineError::NotSupported(_) => "NotSupported",
            EngineError::Other(_) => "Other",
        }
    }
}

// IntoJs for JsResult throws errors into the script instead of returning an object
impl<'js, T: rquickjs::IntoJs<'js>> rquickjs::IntoJs<'js> for JsResult<T> {
    fn into_js(self, ctx: &rquickjs::Ctx<'js>) -> rquickjs::Result<rquickjs::Value<'js>> {
        match self {
            JsResult::Ok(value) => value.into_js(ctx),
            JsResult::Err { error, kind } => {
                // Try to get the specific error constructor from __sandjs__.errors
                let error_class = ctx
                    .globals()
                    .get::<_, rquickjs::Object>("__sandjs__")
                    .and_then(|sandjs| sandjs.get::<_, rquickjs::Object>("errors"))
                    .and_then(|errors| errors.get::<_, rquickjs::Function>(kind.as_str()));

                let error_value = if let Ok(error_ctor) = error_class {
                    // Create error instance by setting the prototype manually
                    let instance = rquickjs::Object::new(ctx.clone())?;

                    if let Ok(prototype) = error_ctor.get::<_, rquickjs::Object>("prototype") {
                        instance.set_prototype(Some(&prototype))?;
                    }

                    instance.set("message", error.as_str())?;
                    instance.set("name", kind.as_str())?;

                    instance.into_value()
                } else {
                    // Fallback: use generic Error
                    rquickjs::Exception::from_message(ctx.clone(), &error)?.into()
                };

                Err(ctx.throw(error_value))
            }
        }
    }
}

#[macro_export]
macro_rules! add_internal_function {
    ($ctx:expr, $name:expr, $func:expr) => {{
        use rquickjs::function::Func;
        let temp_name = format!("__sandjs_internal_{}", $name.replace('.', "_"));
        let internal_path = format!("globalThis[Symbol.for('sandjs.internal')].{}", $name);

        let func = Func::from($func);
        $ctx.globals().set(temp_name.as_str(), func)?;
        $ctx.eval::<(), _>(format!(
            "{} = globalThis.{}; delete globalThis.{};",
            internal_path, temp_name, temp_name
        ))?
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_maps_to_class() {
        let err = EngineError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.error_class(), "NotFound");
    }

    #[test]
    fn sandbox_error_has_own_class() {
        let err = EngineError::Sandbox("../secret".to_string());
        assert_eq!(err.error_class(), "SandboxViolation");
    }

    #[test]
    fn safe_path_starts_unconfigured() {
        let safe = SafePath::new();
        assert!(!safe.is_configured());
        assert!(safe.get().is_none());

        safe.set(PathBuf::from("/tmp"));
        assert!(safe.is_configured());
        assert_eq!(safe.get(), Some(PathBuf::from("/tmp")));
    }
}
