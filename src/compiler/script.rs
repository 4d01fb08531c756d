//! Script evaluation for template declarations and expressions.
//!
//! The compiler only needs a narrow capability from a script engine:
//! register host functions, run the declarations once, then evaluate each
//! expression to text. [`ScriptContext`] is that capability; [`BoaContext`]
//! implements it on top of `boa_engine`.
//!
//! A context is created for one compile and dropped with it. Bindings made by
//! the declarations (and any mutation done by an expression) stay visible to
//! later expressions of the same compile only.
//!
//! `boa_engine::Context` is `!Send`, which fits: a compile runs start to
//! finish on the thread that called it.

use std::cell::RefCell;
use std::rc::Rc;

use boa_engine::{Context, JsError, JsResult, JsString, JsValue, NativeFunction, Source, js_string};
use boa_gc::{Finalize, Gc, Trace};

use super::directive::{IMPORT_CSS, IMPORT_JS};
use super::error::ScriptError;

/// Callback invoked with the text form of a host function's first argument.
pub type HostCallback = Rc<dyn Fn(String)>;

/// Engine capability required by the template compiler.
pub trait ScriptContext {
    /// Expose `name` to scripts. Calls with no argument are ignored; otherwise
    /// `callback` receives the first argument converted to text. The
    /// function itself returns `undefined`.
    fn register(&mut self, name: &str, callback: HostCallback) -> Result<(), ScriptError>;

    /// Run the declarations block as a statement sequence.
    fn run_declarations(&mut self, source: &str) -> Result<(), ScriptError>;

    /// Evaluate one expression and serialize its value to text.
    fn evaluate(&mut self, expr: &str) -> Result<String, ScriptError>;
}

// ============================================================================
// Import accumulators
// ============================================================================

/// Ordered import lists filled by the `importCSS`/`importJS` host functions.
#[derive(Debug, Clone, Default)]
pub struct ImportSink {
    css: Rc<RefCell<Vec<String>>>,
    js: Rc<RefCell<Vec<String>>>,
}

impl ImportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both import host functions on `ctx`.
    pub fn install(&self, ctx: &mut dyn ScriptContext) -> Result<(), ScriptError> {
        let css = Rc::clone(&self.css);
        ctx.register(IMPORT_CSS, Rc::new(move |path| css.borrow_mut().push(path)))?;

        let js = Rc::clone(&self.js);
        ctx.register(IMPORT_JS, Rc::new(move |path| js.borrow_mut().push(path)))?;
        Ok(())
    }

    /// Take everything recorded since the last call.
    pub fn drain(&self) -> (Vec<String>, Vec<String>) {
        (
            std::mem::take(&mut *self.css.borrow_mut()),
            std::mem::take(&mut *self.js.borrow_mut()),
        )
    }
}

// ============================================================================
// boa_engine implementation
// ============================================================================

/// Host callback stored in the engine's garbage-collected heap.
#[derive(Trace, Finalize)]
struct HostFn {
    #[unsafe_ignore_trace]
    callback: HostCallback,
}

/// Fresh `boa_engine` context scoped to a single compile.
pub struct BoaContext {
    context: Context,
}

impl BoaContext {
    pub fn new() -> Self {
        Self {
            context: Context::default(),
        }
    }
}

impl Default for BoaContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptContext for BoaContext {
    fn register(&mut self, name: &str, callback: HostCallback) -> Result<(), ScriptError> {
        let captures = Gc::new(HostFn { callback });
        let function = NativeFunction::from_copy_closure_with_captures(
            |_this, args, host: &Gc<HostFn>, context| {
                if let Some(arg) = args.first() {
                    let text = arg.to_string(context)?.to_std_string_escaped();
                    (host.callback)(text);
                }
                Ok(JsValue::undefined())
            },
            captures,
        );

        self.context
            .register_global_callable(JsString::from(name), 1, function)
            .map_err(|e| ScriptError::new(error_message(&e, &mut self.context)))
    }

    fn run_declarations(&mut self, source: &str) -> Result<(), ScriptError> {
        if source.is_empty() {
            return Ok(());
        }
        self.context
            .eval(Source::from_bytes(source))
            .map(|_| ())
            .map_err(|e| ScriptError::new(error_message(&e, &mut self.context)))
    }

    fn evaluate(&mut self, expr: &str) -> Result<String, ScriptError> {
        let value = self
            .context
            .eval(Source::from_bytes(expr))
            .map_err(|e| ScriptError::new(error_message(&e, &mut self.context)))?;
        Ok(value_to_text(&value, &mut self.context))
    }
}

/// Convert a script value to the text substituted into the page.
///
/// - `undefined`/`null` -> empty
/// - strings unchanged, booleans as `true`/`false`
/// - numbers via [`format_number`]
/// - objects and arrays via `JSON.stringify`, falling back to the engine's
///   display form when that yields nothing
fn value_to_text(value: &JsValue, context: &mut Context) -> String {
    if value.is_null_or_undefined() {
        return String::new();
    }
    if let Some(b) = value.as_boolean() {
        return b.to_string();
    }
    if let Some(n) = value.as_number() {
        return format_number(n);
    }
    if value.is_object()
        && let Ok(Some(json)) = stringify_json(value, context)
    {
        return json;
    }
    value
        .to_string(context)
        .map(|s| s.to_std_string_escaped())
        .unwrap_or_else(|_| value.display().to_string())
}

/// Serialize through the engine's own `JSON.stringify`.
fn stringify_json(value: &JsValue, context: &mut Context) -> JsResult<Option<String>> {
    let global = context.global_object();
    let json = global.get(js_string!("JSON"), context)?;
    let Some(json_obj) = json.as_object() else {
        return Ok(None);
    };
    let stringify = json_obj.get(js_string!("stringify"), context)?;
    let Some(function) = stringify.as_callable() else {
        return Ok(None);
    };
    let result = function.call(&json, std::slice::from_ref(value), context)?;
    if !result.is_string() {
        return Ok(None);
    }
    Ok(Some(result.to_string(context)?.to_std_string_escaped()))
}

/// Whole numbers print as integers, everything else in shortest round-trip form.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.fract() == 0.0 {
        if n.abs() <= i64::MAX as f64 {
            return (n as i64).to_string();
        }
        return format!("{n:e}");
    }
    n.to_string()
}

/// Render an engine error as `Name: message`.
fn error_message(error: &JsError, context: &mut Context) -> String {
    error
        .to_opaque(context)
        .to_string(context)
        .map(|s| s.to_std_string_escaped())
        .unwrap_or_else(|_| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(ctx: &mut BoaContext, expr: &str) -> String {
        ctx.evaluate(expr).unwrap()
    }

    #[test]
    fn test_value_serialization() {
        let mut ctx = BoaContext::new();
        assert_eq!(eval(&mut ctx, r#""abc""#), "abc");
        assert_eq!(eval(&mut ctx, "1 + 2"), "3");
        assert_eq!(eval(&mut ctx, "1.5"), "1.5");
        assert_eq!(eval(&mut ctx, "true"), "true");
        assert_eq!(eval(&mut ctx, "false"), "false");
        assert_eq!(eval(&mut ctx, "[1,2]"), "[1,2]");
        assert_eq!(eval(&mut ctx, r#"({a: 1, b: "x"})"#), r#"{"a":1,"b":"x"}"#);
        assert_eq!(eval(&mut ctx, "null"), "");
        assert_eq!(eval(&mut ctx, "undefined"), "");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e300), "1e300");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_declarations_shared_across_expressions() {
        let mut ctx = BoaContext::new();
        ctx.run_declarations("let count = 1; const name = 'vaayu';")
            .unwrap();
        assert_eq!(eval(&mut ctx, "name"), "vaayu");
        assert_eq!(eval(&mut ctx, "count += 1"), "2");
        assert_eq!(eval(&mut ctx, "count"), "2");
    }

    #[test]
    fn test_contexts_are_isolated() {
        let mut first = BoaContext::new();
        first.run_declarations("var leaked = 1;").unwrap();

        let mut second = BoaContext::new();
        assert!(second.evaluate("leaked").is_err());
    }

    #[test]
    fn test_errors_carry_engine_message() {
        let mut ctx = BoaContext::new();
        let err = ctx.evaluate("missing + 1").unwrap_err();
        assert!(err.0.contains("missing"), "{err}");

        let err = ctx.run_declarations("let = ;").unwrap_err();
        assert!(!err.0.is_empty());
    }

    #[test]
    fn test_import_sink_records_calls() {
        let mut ctx = BoaContext::new();
        let sink = ImportSink::new();
        sink.install(&mut ctx).unwrap();

        ctx.run_declarations("importCSS('a.css'); importJS('b.js'); importCSS();")
            .unwrap();
        assert_eq!(eval(&mut ctx, "importJS('c' + '.js')"), "");

        let (css, js) = sink.drain();
        assert_eq!(css, ["a.css"]);
        assert_eq!(js, ["b.js", "c.js"]);

        // Drained lists start empty again
        assert_eq!(sink.drain(), (Vec::new(), Vec::new()));
    }
}
