use crate::script_file;
use std::error::Error;
use std::path::Path;

pub fn execute(
    file_path: &str,
    plugin_dir: &str,
    safe_path: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let interpreter = super::new_interpreter(plugin_dir, safe_path)?;

    // A script that cannot be read still runs (as empty) and prints its
    // empty result; read_script reports the failure on stderr.
    let script = script_file::read_script(Path::new(file_path));
    let result = interpreter.run_script(&script)?;

    println!("{result}");
    Ok(())
}
