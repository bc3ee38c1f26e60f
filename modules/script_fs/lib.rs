use rquickjs::{Ctx, Module, Result as QuickResult};
use sandjs_path_util::{SandboxError, resolve_sandboxed};
use std::fs;
use std::path::PathBuf;
use utils::{EngineError, EngineResult, JsResult, SafePath, add_internal_function};

#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub is_file: bool,
    pub is_directory: bool,
}

impl<'js> rquickjs::IntoJs<'js> for DirEntry {
    fn into_js(self, ctx: &rquickjs::Ctx<'js>) -> rquickjs::Result<rquickjs::Value<'js>> {
        let obj = rquickjs::Object::new(ctx.clone())?;
        obj.set("name", self.name)?;
        obj.set("isFile", self.is_file)?;
        obj.set("isDirectory", self.is_directory)?;
        Ok(obj.into_value())
    }
}

/// Resolve a script-supplied path through the sandbox. Every `File`
/// operation goes through here; without a configured safe path no disk
/// access is possible.
fn resolve(safe: &SafePath, requested: &str) -> EngineResult<PathBuf> {
    let Some(root) = safe.get() else {
        return Err(EngineError::Denied(
            "no disk access: safe path is not configured".to_string(),
        ));
    };
    resolve_sandboxed(&root, requested).map_err(|e| match e {
        SandboxError::Escape { .. } => EngineError::Sandbox(e.to_string()),
        SandboxError::Io(io) => EngineError::Io(io),
    })
}

/// # Errors
/// Returns an error if module initialization fails
pub fn init(ctx: &Ctx<'_>, safe_path: &SafePath) -> QuickResult<()> {
    // Ensure the internal symbol object and nested fs object exist
    ctx.eval::<(), _>("globalThis[Symbol.for('sandjs.internal')] ||= {}; globalThis[Symbol.for('sandjs.internal')].fs ||= {};")?;

    setup_internal(ctx, safe_path)?;

    // Register the File API as a module
    let module = Module::evaluate(ctx.clone(), "script_fs", include_str!("script_fs.js"))?;
    module.finish::<()>()?;

    Ok(())
}

fn setup_internal(ctx: &Ctx<'_>, safe_path: &SafePath) -> QuickResult<()> {
    // readText(path: string): string
    let safe = safe_path.clone();
    add_internal_function!(ctx, "fs.readText", move |path: String| -> JsResult<String> {
        let result: EngineResult<String> = (|| {
            let resolved = resolve(&safe, &path)?;
            Ok(fs::read_to_string(resolved)?)
        })();
        result.into()
    });

    // writeText(path: string, text: string): void
    let safe = safe_path.clone();
    add_internal_function!(
        ctx,
        "fs.writeText",
        move |path: String, text: String| -> JsResult<()> {
            let result: EngineResult<()> = (|| {
                let resolved = resolve(&safe, &path)?;
                fs::write(resolved, text)?;
                Ok(())
            })();
            result.into()
        }
    );

    // exists(path: string): boolean
    let safe = safe_path.clone();
    add_internal_function!(ctx, "fs.exists", move |path: String| -> JsResult<bool> {
        let result: EngineResult<bool> = (|| {
            let resolved = resolve(&safe, &path)?;
            Ok(resolved.exists())
        })();
        result.into()
    });

    // list(path: string): DirEntry[]
    let safe = safe_path.clone();
    add_internal_function!(
        ctx,
        "fs.list",
        move |path: String| -> JsResult<Vec<DirEntry>> {
            let result: EngineResult<Vec<DirEntry>> = (|| {
                let resolved = resolve(&safe, &path)?;
                let mut entries = Vec::new();
                for entry in fs::read_dir(resolved)? {
                    let entry = entry?;
                    let file_type = entry.file_type()?;
                    let name = entry
                        .file_name()
                        .into_string()
                        .map_err(|_| EngineError::Other("Invalid filename".to_string()))?;
                    entries.push(DirEntry {
                        name,
                        is_file: file_type.is_file(),
                        is_directory: file_type.is_dir(),
                    });
                }
                Ok(entries)
            })();
            result.into()
        }
    );

    // mkdir(path: string): void
    let safe = safe_path.clone();
    add_internal_function!(ctx, "fs.mkdir", move |path: String| -> JsResult<()> {
        let result: EngineResult<()> = (|| {
            let resolved = resolve(&safe, &path)?;
            fs::create_dir_all(resolved)?;
            Ok(())
        })();
        result.into()
    });

    // remove(path: string): void - removes a file or an empty directory
    let safe = safe_path.clone();
    add_internal_function!(ctx, "fs.remove", move |path: String| -> JsResult<()> {
        let result: EngineResult<()> = (|| {
            let resolved = resolve(&safe, &path)?;
            if !resolved.exists() {
                return Err(
                    std::io::Error::new(std::io::ErrorKind::NotFound, "Path not found").into(),
                );
            }
            if resolved.is_dir() {
                fs::remove_dir(resolved)?;
            } else {
                fs::remove_file(resolved)?;
            }
            Ok(())
        })();
        result.into()
    });

    Ok(())
}
