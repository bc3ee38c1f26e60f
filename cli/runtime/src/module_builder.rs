use crate::{Plugin, ScriptError, describe_caught};
use rquickjs::{CatchResultExt, Ctx, Result};

/// Collects the native module initializers and the discovered plugins for a
/// context, in attachment order. Built-ins attach before plugins so plugin
/// code may already use `File`, `console` and `jexport`.
pub struct ModuleBuilder {
    globals: Vec<Box<dyn Fn(&Ctx<'_>) -> Result<()>>>,
    plugins: Vec<Plugin>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self {
            globals: Vec::new(),
            plugins: Vec::new(),
        }
    }

    pub fn with_global(mut self, init: impl Fn(&Ctx<'_>) -> Result<()> + 'static) -> Self {
        self.globals.push(Box::new(init));
        self
    }

    pub fn with_plugins(mut self, plugins: Vec<Plugin>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    pub fn build(self) -> GlobalAttachment {
        GlobalAttachment {
            globals: self.globals,
            plugins: self.plugins,
        }
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct GlobalAttachment {
    globals: Vec<Box<dyn Fn(&Ctx<'_>) -> Result<()>>>,
    plugins: Vec<Plugin>,
}

impl GlobalAttachment {
    /// # Errors
    /// Returns an error if a built-in module fails to initialize or a
    /// plugin throws while being evaluated.
    pub fn attach(&self, ctx: &Ctx<'_>) -> std::result::Result<(), ScriptError> {
        for init in &self.globals {
            init(ctx).map_err(ScriptError::Engine)?;
        }

        // Plugins are plain scripts; evaluating them as global code is what
        // registers their globals (e.g. an IJ object).
        for plugin in &self.plugins {
            ctx.eval::<(), _>(plugin.source.as_str())
                .catch(ctx)
                .map_err(|caught| {
                    let (message, _stack) = describe_caught(&caught);
                    ScriptError::Plugin {
                        name: plugin.name.clone(),
                        message,
                    }
                })?;
        }

        Ok(())
    }
}
