use std::error::Error;

pub fn execute(code: &str, plugin_dir: &str, safe_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let interpreter = super::new_interpreter(plugin_dir, safe_path)?;
    let result = interpreter.run_script(code)?;

    println!("{result}");
    Ok(())
}
