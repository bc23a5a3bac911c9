//! Command Dispatcher: runs `commandList` in document order.
//!
//! Each descriptor either succeeds (optionally binding its result) or
//! records one fault; either way the next descriptor runs.

use serde_json::Value as Json;
use tracing::debug;

use crate::allowlist::{Attribute, Callable};
use crate::config::EngineConfig;
use crate::error::RequestFault;
use crate::library::DomainLibrary;
use crate::request::{Command, CommandDescriptor};
use crate::value::Value;

use super::context::{BindingTable, RequestContext};
use super::resolver::resolve_argument;

pub fn execute_commands(
    commands: &[CommandDescriptor],
    ctx: &mut RequestContext,
    library: &dyn DomainLibrary,
    config: &EngineConfig,
) {
    for (index, descriptor) in commands.iter().enumerate() {
        if let Some(max) = config.max_commands {
            if index >= max {
                ctx.fail(RequestFault::MalformedData(format!(
                    "command limit of {max} exceeded, not executed: {}",
                    descriptor.source
                )));
                continue;
            }
        }

        let outcome = descriptor
            .classify()
            .and_then(|command| execute(command, descriptor, &ctx.bindings, library));
        match outcome {
            Ok((Some(target), value)) => {
                debug!(index, var = target, kind = value.type_name(), "bound command result");
                ctx.bindings.set(target, value);
            }
            Ok((None, _)) => debug!(index, "command result discarded"),
            Err(fault) => ctx.fail(fault),
        }
    }
}

fn execute<'a>(
    command: Command<'a>,
    descriptor: &CommandDescriptor,
    bindings: &BindingTable,
    library: &dyn DomainLibrary,
) -> Result<(Option<&'a str>, Value), RequestFault> {
    let source = &descriptor.source;
    match command {
        Command::FunctionCall {
            name,
            args,
            caller,
            result_var,
        } => {
            let callable = Callable::from_name(name).ok_or_else(|| {
                RequestFault::DisallowedOperation(format!("unknown function {name} :{source}"))
            })?;
            let args = resolve_arguments(args, bindings, source)?;
            let result = match caller {
                Some(caller) => require_caller(caller, bindings, source)?.call(callable, &args),
                None => library.call_free(callable, &args),
            };
            let value = result.map_err(|fault| {
                RequestFault::Invocation(format!(
                    "Error: {fault} executing function {name} :{source}"
                ))
            })?;
            Ok((result_var, value))
        }
        Command::AttributeRead {
            name,
            args,
            caller,
            result_var,
        } => {
            let attribute = Attribute::from_name(name).ok_or_else(|| {
                RequestFault::DisallowedOperation(format!("unknown attribute {name} :{source}"))
            })?;
            if args.is_some() {
                return Err(RequestFault::BothOrNeither(format!(
                    "No args should be specified with attribute :{source}"
                )));
            }
            let caller = caller.ok_or_else(|| {
                RequestFault::UnresolvedBinding(format!(
                    "Caller must be specified with attribute :{source}"
                ))
            })?;
            let value = require_caller(caller, bindings, source)?
                .attribute(attribute)
                .map_err(|fault| {
                    RequestFault::Invocation(format!(
                        "Error: {fault} reading attribute {name} :{source}"
                    ))
                })?;
            Ok((result_var, value))
        }
    }
}

fn require_caller<'b>(
    caller: &str,
    bindings: &'b BindingTable,
    source: &Json,
) -> Result<&'b Value, RequestFault> {
    bindings
        .get(caller)
        .ok_or_else(|| RequestFault::UnresolvedBinding(format!("{caller} not defined {source}")))
}

/// Resolve every argument token; the first unresolvable one fails the
/// whole descriptor.
fn resolve_arguments(
    args: Option<&Json>,
    bindings: &BindingTable,
    source: &Json,
) -> Result<Vec<Value>, RequestFault> {
    let tokens = match args {
        None => return Ok(Vec::new()),
        Some(Json::Array(tokens)) => tokens,
        Some(other) => {
            return Err(RequestFault::MalformedData(format!(
                "invalid argument list {other} :{source}"
            )))
        }
    };
    tokens
        .iter()
        .map(|token| {
            resolve_argument(token, bindings).ok_or_else(|| {
                RequestFault::MalformedData(format!("invalid argument {token} :{source}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaultKind;
    use crate::library::MemoryLibrary;
    use crate::request::RequestDocument;
    use serde_json::json;

    fn library() -> MemoryLibrary {
        MemoryLibrary::new().with_work("bwv7.7", "G4 A4 B4/2\nG3/2 D3/2")
    }

    fn run(commands: Json) -> RequestContext {
        run_with(commands, &EngineConfig::default())
    }

    fn run_with(commands: Json, config: &EngineConfig) -> RequestContext {
        let body = json!({
            "dataDict": {"n": {"fmt": "int", "data": "2"}},
            "commandList": commands
        })
        .to_string();
        let doc = RequestDocument::from_json(&body).unwrap();
        let mut ctx = RequestContext::new();
        let lib = library();
        crate::engine::resolver::resolve_data(&doc.data, &mut ctx, &lib, config);
        execute_commands(&doc.commands, &mut ctx, &lib, config);
        ctx
    }

    fn kinds(ctx: &RequestContext) -> Vec<FaultKind> {
        ctx.errors.faults().iter().map(|f| f.kind()).collect()
    }

    #[test]
    fn free_call_then_method_then_attributes() {
        let ctx = run(json!([
            {"function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "sc"},
            {"function": "transpose", "caller": "sc", "argList": ["'p5'"], "resultVariable": "sc"},
            {"attribute": "flat", "caller": "sc", "resultVariable": "scFlat"},
            {"attribute": "highestOffset", "caller": "scFlat", "resultVariable": "ho"}
        ]));
        assert!(ctx.errors.is_empty(), "{:?}", ctx.errors.faults());
        assert_eq!(ctx.bindings.get("ho"), Some(&Value::Float(2.0)));
        assert_eq!(ctx.bindings.get("scFlat").unwrap().type_name(), "Stream");
    }

    #[test]
    fn unknown_function_is_disallowed() {
        let ctx = run(json!([{"function": "unknownFn", "argList": []}]));
        assert_eq!(kinds(&ctx), vec![FaultKind::DisallowedOperationError]);
        assert!(ctx.errors.faults()[0].to_string().contains("unknownFn"));
    }

    #[test]
    fn allowlist_checked_before_caller() {
        let ctx = run(json!([
            {"function": "eval", "caller": "missing"},
            {"attribute": "__dict__", "caller": "n"}
        ]));
        assert_eq!(
            kinds(&ctx),
            vec![FaultKind::DisallowedOperationError, FaultKind::DisallowedOperationError]
        );
    }

    #[test]
    fn both_or_neither() {
        let ctx = run(json!([
            {"function": "transpose", "attribute": "flat", "caller": "n"},
            {"caller": "n", "resultVariable": "x"}
        ]));
        assert_eq!(
            kinds(&ctx),
            vec![FaultKind::BothOrNeitherError, FaultKind::BothOrNeitherError]
        );
        assert!(!ctx.bindings.contains("x"));
    }

    #[test]
    fn unresolvable_argument_aborts_descriptor() {
        let ctx = run(json!([
            {"function": "corpus.parse", "argList": ["bwv7.7"], "resultVariable": "sc"}
        ]));
        assert_eq!(kinds(&ctx), vec![FaultKind::MalformedDataError]);
        assert!(ctx.errors.faults()[0].to_string().starts_with("invalid argument"));
        assert!(!ctx.bindings.contains("sc"));
    }

    #[test]
    fn arg_list_must_be_an_array() {
        let ctx = run(json!([{"function": "corpus.parse", "argList": "'bwv7.7'"}]));
        assert!(ctx.errors.faults()[0].to_string().starts_with("invalid argument list"));
    }

    #[test]
    fn forward_reference_is_unresolved() {
        let ctx = run(json!([
            {"function": "transpose", "caller": "sc", "argList": ["n"], "resultVariable": "up"},
            {"function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "sc"}
        ]));
        assert_eq!(kinds(&ctx), vec![FaultKind::UnresolvedBindingError]);
        assert!(ctx.bindings.contains("sc"));
        assert!(!ctx.bindings.contains("up"));
    }

    #[test]
    fn arguments_may_reference_bindings() {
        let ctx = run(json!([
            {"function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "sc"},
            {"function": "augmentOrDiminish", "caller": "sc", "argList": ["n"], "resultVariable": "big"},
            {"attribute": "flat", "caller": "big", "resultVariable": "f"},
            {"attribute": "highestOffset", "caller": "f", "resultVariable": "ho"}
        ]));
        assert!(ctx.errors.is_empty());
        assert_eq!(ctx.bindings.get("ho"), Some(&Value::Float(4.0)));
    }

    #[test]
    fn attribute_rules() {
        let ctx = run(json!([
            {"attribute": "flat", "resultVariable": "x"},
            {"attribute": "flat", "caller": "nope"},
            {"attribute": "flat", "caller": "n", "argList": []}
        ]));
        assert_eq!(
            kinds(&ctx),
            vec![
                FaultKind::UnresolvedBindingError,
                FaultKind::UnresolvedBindingError,
                FaultKind::BothOrNeitherError
            ]
        );
    }

    #[test]
    fn library_faults_become_invocation_faults() {
        let ctx = run(json!([
            {"function": "transpose", "caller": "n", "argList": ["'p5'"]},
            {"attribute": "flat", "caller": "n"},
            {"function": "corpus.parse", "argList": ["'missing'"]},
            {"function": "transpose", "argList": [1]}
        ]));
        assert_eq!(kinds(&ctx), vec![FaultKind::InvocationFault; 4]);
        let first = ctx.errors.faults()[0].to_string();
        assert!(first.starts_with("Error: 'int' object has no attribute 'transpose' executing function transpose"));
    }

    #[test]
    fn last_write_wins() {
        let ctx = run(json!([
            {"function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "v"},
            {"attribute": "highestOffset", "caller": "v", "resultVariable": "v"}
        ]));
        assert!(ctx.errors.is_empty());
        assert_eq!(ctx.bindings.get("v"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn result_without_variable_is_discarded() {
        let ctx = run(json!([{"function": "corpus.parse", "argList": ["'bwv7.7'"]}]));
        assert!(ctx.errors.is_empty());
        assert_eq!(ctx.bindings.names(), vec!["n"]);
    }

    #[test]
    fn command_limit() {
        let config = EngineConfig::default().with_max_commands(1);
        let ctx = run_with(
            json!([
                {"function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "a"},
                {"function": "corpus.parse", "argList": ["'bwv7.7'"], "resultVariable": "b"}
            ]),
            &config,
        );
        assert!(ctx.bindings.contains("a"));
        assert!(!ctx.bindings.contains("b"));
        assert!(ctx.errors.faults()[0].to_string().starts_with("command limit of 1 exceeded"));
    }
}
