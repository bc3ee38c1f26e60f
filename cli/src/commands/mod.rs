pub mod eval;
pub mod run;

use crate::error_fmt::format_error_chain;
use sandjs_runtime::ScriptingInstance;
use std::error::Error;

/// Build an interpreter with the plugin directory and optional safe path.
/// Failures are reported with the numbered error chain so a broken plugin
/// names its underlying cause.
pub fn new_interpreter(
    plugin_dir: &str,
    safe_path: Option<&str>,
) -> Result<ScriptingInstance, Box<dyn Error>> {
    let interpreter = match ScriptingInstance::new(plugin_dir) {
        Ok(interpreter) => interpreter,
        Err(e) => {
            let error_chain = format_error_chain(&e);
            return Err(format!("Failed to start the interpreter.{error_chain}").into());
        }
    };

    if let Some(safe_path) = safe_path {
        if let Err(e) = interpreter.set_safe_path(safe_path) {
            let error_chain = format_error_chain(&e);
            return Err(format!("Failed to set the safe path.{error_chain}").into());
        }
    }

    Ok(interpreter)
}
