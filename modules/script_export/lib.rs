use rquickjs::{Ctx, Module, Result as QuickResult};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use utils::{EngineError, EngineResult, JsResult, add_internal_function};

/// Values a script registered with `jexport`, in insertion order.
///
/// The JS glue stringifies each value before crossing the boundary, so the
/// registry only ever sees JSON text. Re-exporting a name overwrites the
/// value without moving its position.
#[derive(Clone, Default)]
pub struct ExportRegistry {
    entries: Arc<Mutex<Map<String, Value>>>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// # Errors
    /// Returns an error if `raw` is not valid JSON text
    pub fn insert_json(&self, name: &str, raw: &str) -> EngineResult<()> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| EngineError::Other(format!("jexport: value is not exportable: {e}")))?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| EngineError::Other("export registry is poisoned".to_string()))?;
        entries.insert(name.to_string(), value);
        Ok(())
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

/// # Errors
/// Returns an error if module initialization fails
pub fn init(ctx: &Ctx<'_>, registry: &ExportRegistry) -> QuickResult<()> {
    let reg = registry.clone();
    add_internal_function!(
        ctx,
        "exportValue",
        move |name: String, json: String| -> JsResult<()> {
            let result: EngineResult<()> = reg.insert_json(&name, &json);
            result.into()
        }
    );

    let module = Module::evaluate(ctx.clone(), "script_export", include_str!("export.js"))?;
    module.finish::<()>()?;

    Ok(())
}
