use rquickjs::{Ctx, Module};

pub fn init(ctx: &Ctx<'_>) -> rquickjs::Result<()> {
    // Initialize __sandjs__ namespace structure
    ctx.eval::<(), _>(
        r#"
        globalThis[Symbol.for("sandjs.internal")] ||= {};
        globalThis[Symbol.for("sandjs.internal")].fs ||= {};
        globalThis.__sandjs__ ||= {};
        globalThis.__sandjs__.errors ||= {};
        "#,
    )?;

    // Load error classes
    let errors_module =
        Module::evaluate(ctx.clone(), "engine_errors", include_str!("engine_errors.js"))?;
    errors_module.finish::<()>()?;

    Ok(())
}
