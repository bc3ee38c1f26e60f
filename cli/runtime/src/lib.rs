use rquickjs::{CatchResultExt, CaughtError, Context, Ctx, Runtime};
use script_export::ExportRegistry;
use serde_json::{Map, Value};
use std::path::Path;
use utils::SafePath;

pub mod module_builder;
mod plugins;

pub use plugins::Plugin;

/// Errors surfaced by a [`ScriptingInstance`].
#[derive(Debug)]
pub enum ScriptError {
    Engine(rquickjs::Error),
    /// The script threw; message and JS stack of the exception
    Evaluation {
        message: String,
        stack: Option<String>,
    },
    /// A plugin threw while it was being loaded
    Plugin { name: String, message: String },
    /// The requested safe path does not exist or cannot be canonicalized
    SafePath(std::io::Error),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::Engine(e) => write!(f, "{e}"),
            ScriptError::Evaluation { message, stack } => {
                write!(f, "{message}")?;
                if let Some(stack) = stack {
                    write!(f, "\n{stack}")?;
                }
                Ok(())
            }
            ScriptError::Plugin { name, message } => {
                write!(f, "plugin \"{name}\" failed to load: {message}")
            }
            ScriptError::SafePath(e) => write!(f, "safe path is not usable: {e}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::Engine(e) => Some(e),
            ScriptError::SafePath(e) => Some(e),
            ScriptError::Evaluation { .. } | ScriptError::Plugin { .. } => None,
        }
    }
}

impl From<rquickjs::Error> for ScriptError {
    fn from(e: rquickjs::Error) -> Self {
        ScriptError::Engine(e)
    }
}

/// The values one `run_script` call registered with `jexport`, rendered as
/// the compact JSON text `{"result":{...}}` with insertion order preserved.
#[derive(Debug, Clone)]
pub struct ScriptResult {
    exports: Map<String, Value>,
}

impl ScriptResult {
    fn new(exports: Map<String, Value>) -> Self {
        Self { exports }
    }

    pub fn to_json(&self) -> Value {
        let mut wrapper = Map::new();
        wrapper.insert("result".to_string(), Value::Object(self.exports.clone()));
        Value::Object(wrapper)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.exports.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl std::fmt::Display for ScriptResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// An embedded JavaScript interpreter with a plugin search directory and an
/// optional safe path confining what its scripts may touch on disk.
///
/// Construction attaches the built-in modules (console, `File`, `jexport`)
/// and evaluates every plugin found in the search directory. Scripts then
/// run as global code, so plugin globals and earlier definitions stay
/// visible across runs on the same instance.
pub struct ScriptingInstance {
    runtime: Runtime,
    context: Context,
    exports: ExportRegistry,
    safe_path: SafePath,
    plugin_names: Vec<String>,
}

impl ScriptingInstance {
    /// # Errors
    /// Returns an error if the engine cannot be created, a built-in module
    /// fails to attach, or a plugin throws while loading. A missing plugin
    /// directory is tolerated and reported on stderr.
    pub fn new(plugin_dir: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;

        let exports = ExportRegistry::new();
        let safe_path = SafePath::new();

        let plugins = plugins::discover(plugin_dir.as_ref());
        let plugin_names = plugins.iter().map(|p| p.name.clone()).collect();

        let fs_safe_path = safe_path.clone();
        let export_registry = exports.clone();
        let attachment = module_builder::ModuleBuilder::new()
            .with_global(script_common::init)
            .with_global(script_console::init)
            .with_global(move |ctx: &Ctx<'_>| script_fs::init(ctx, &fs_safe_path))
            .with_global(move |ctx: &Ctx<'_>| script_export::init(ctx, &export_registry))
            .with_plugins(plugins)
            .build();

        context.with(|ctx| attachment.attach(&ctx))?;

        Ok(Self {
            runtime,
            context,
            exports,
            safe_path,
            plugin_names,
        })
    }

    /// Confine script disk access to `path`. Until this is called no disk
    /// access is possible for scripts.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be canonicalized.
    pub fn set_safe_path(&self, path: impl AsRef<Path>) -> Result<(), ScriptError> {
        let canonical = std::fs::canonicalize(path.as_ref()).map_err(ScriptError::SafePath)?;
        self.safe_path
            .set(sandjs_path_util::strip_unc_prefix(canonical));
        Ok(())
    }

    /// Run `source` as global code and return what it exported.
    ///
    /// # Errors
    /// Returns `ScriptError::Evaluation` when the script or one of its
    /// pending jobs throws.
    pub fn run_script(&self, source: &str) -> Result<ScriptResult, ScriptError> {
        self.exports.clear();

        self.context.with(|ctx| {
            ctx.eval::<(), _>(source).catch(&ctx).map_err(|caught| {
                let (message, stack) = describe_caught(&caught);
                ScriptError::Evaluation { message, stack }
            })
        })?;

        // Execute all pending jobs (promises, microtasks)
        self.drain_pending_jobs()?;

        Ok(ScriptResult::new(self.exports.snapshot()))
    }

    /// Names of the plugins evaluated at construction, in load order.
    pub fn plugin_names(&self) -> &[String] {
        &self.plugin_names
    }

    fn drain_pending_jobs(&self) -> Result<(), ScriptError> {
        loop {
            match self.runtime.execute_pending_job() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(_) => {
                    return Err(ScriptError::Evaluation {
                        message: "unhandled exception in a pending job".to_string(),
                        stack: None,
                    });
                }
            }
        }
    }
}

pub(crate) fn describe_caught(caught: &CaughtError<'_>) -> (String, Option<String>) {
    match caught {
        CaughtError::Exception(exception) => (
            exception
                .message()
                .unwrap_or_else(|| "Exception (no message)".to_string()),
            exception.stack(),
        ),
        CaughtError::Value(value) => (format!("{value:?}"), None),
        CaughtError::Error(error) => (format!("{error:?}"), None),
    }
}
