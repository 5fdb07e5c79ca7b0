//! Go emitter

use crate::Result;
use crate::definition::UintWidth;
use crate::emit::{
    Emitter, GENERATED_BANNER, Target, ensure_distinct, ensure_not_reserved, quoted,
};
use crate::synth::ir::*;

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Receiver name of every generated method
const RECEIVER: &str = "fsm";

/// Fields of the generated struct; a method may not share their names
const FIELDS: &[&str] = &["State", "hook"];

const FMT_IMPORT: &str = "fmt";
const SLOG_IMPORT: &str = "log/slog";

pub struct GoEmitter;

impl Emitter for GoEmitter {
    fn emit(&self, module: &MachineModule) -> Result<String> {
        check_names(module)?;

        let mut out = String::new();
        header(&mut out, &module.header);
        state_enum(&mut out, &module.states);
        constructor(&mut out, &module.constructor);
        machine_type(&mut out, &module.machine);
        lookup(&mut out, &module.lookup);
        for transition in &module.transitions {
            transition_fn(&mut out, transition);
        }
        Ok(out)
    }
}

fn check_names(module: &MachineModule) -> Result<()> {
    let reserved = |role: &str, name: &str| ensure_not_reserved(Target::Go, role, name, KEYWORDS);

    let machine = module.machine.name.as_str();
    let constructor = format!("New{}", machine);
    let table = state_names(machine);

    // Package-level identifiers
    let states = module
        .states
        .constants
        .iter()
        .zip(&module.lookup.entries)
        .map(|(c, (_, name))| (c.symbol.as_str(), name.as_str()));
    let events = module
        .transitions
        .iter()
        .map(|t| (t.event_symbol.as_str(), t.event.as_str()));
    let symbols: Vec<(&str, &str)> = states.chain(events).collect();
    ensure_distinct(
        [
            (machine, machine),
            (constructor.as_str(), machine),
            (table.as_str(), machine),
        ]
        .into_iter()
        .chain(symbols.iter().copied()),
    )?;

    // Parameters must not shadow anything a method body refers to.
    let mut param_reserved = vec![RECEIVER, "fmt", "slog", "nil", table.as_str()];
    param_reserved.extend(symbols.iter().map(|(symbol, _)| *symbol));

    reserved("package name", &module.header.package)?;
    reserved("machine name", machine)?;
    for t in &module.transitions {
        reserved("event", &t.event)?;
        ensure_not_reserved(Target::Go, "event", &t.event, FIELDS)?;
        for p in &t.params {
            reserved("parameter", &p.name)?;
            ensure_not_reserved(Target::Go, "parameter", &p.name, &param_reserved)?;
        }
    }
    Ok(())
}

fn type_name(width: UintWidth) -> String {
    width.to_string()
}

fn state_names(machine: &str) -> String {
    format!("{}StateNames", machine)
}

fn header(out: &mut String, header: &Header) {
    out.push_str(GENERATED_BANNER);
    out.push('\n');
    if let Some(digest) = &header.source_digest {
        out.push_str(&format!("// Source: {}\n", digest));
    }
    out.push_str(&format!("\npackage {}\n\n", header.package));

    let mut paths: Vec<String> = vec![quoted(FMT_IMPORT)];
    for import in &header.imports {
        let path = match import {
            Import::Logging => quoted(SLOG_IMPORT),
            // Aliased imports (`name "path"`) are already quoted.
            Import::Module(m) if m.contains('"') => m.clone(),
            Import::Module(m) => quoted(m),
        };
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    out.push_str("import (\n");
    for path in paths {
        out.push_str(&format!("\t{}\n", path));
    }
    out.push_str(")\n");
}

fn state_enum(out: &mut String, states: &StateEnum) {
    out.push_str("\nconst (\n");
    for (i, constant) in states.constants.iter().enumerate() {
        if i == 0 {
            out.push_str(&format!(
                "\t{} {} = iota\n",
                constant.symbol,
                type_name(states.width)
            ));
        } else {
            out.push_str(&format!("\t{}\n", constant.symbol));
        }
    }
    out.push_str(")\n");
}

fn constructor(out: &mut String, ctor: &Constructor) {
    let name = &ctor.machine;
    out.push_str(&format!(
        "\n// New{name} returns a {name} in its initial state. hook, when non-nil,\n\
         // receives the ordinal of every event that completes a transition.\n"
    ));
    out.push_str(&format!(
        "func New{name}(hook func(event {})) *{name} {{\n",
        type_name(ctor.event_width)
    ));
    out.push_str(&format!(
        "\treturn &{name}{{State: {}, hook: hook}}\n}}\n",
        ctor.initial_state
    ));
}

fn machine_type(out: &mut String, machine: &MachineType) {
    out.push_str(&format!(
        "\n// {name} is a generated state machine.\ntype {name} struct {{\n",
        name = machine.name
    ));
    out.push_str(&format!("\tState {}\n", type_name(machine.state_width)));
    out.push_str(&format!(
        "\thook  func(event {})\n}}\n",
        type_name(machine.event_width)
    ));
}

fn lookup(out: &mut String, table: &LookupTable) {
    let var = state_names(&table.machine);
    out.push_str(&format!(
        "\n// {var} maps state ordinals to their declared names.\n"
    ));
    out.push_str(&format!(
        "var {var} = map[{}]string{{\n",
        type_name(table.key_width)
    ));
    for (ordinal, name) in &table.entries {
        out.push_str(&format!("\t{}: {},\n", ordinal, quoted(name)));
    }
    out.push_str("}\n");
}

fn transition_fn(out: &mut String, t: &TransitionFn) {
    let names = state_names(&t.machine);
    let signature = t
        .params
        .iter()
        .map(|p| format!("{} {}", p.name, p.param_type))
        .collect::<Vec<_>>()
        .join(", ");

    out.push_str(&format!(
        "\nconst {} {} = {}\n",
        t.event_symbol,
        type_name(t.event_width),
        t.ordinal
    ));
    out.push_str(&format!(
        "\n// {} moves the machine to {}. It fails without changing state when the\n\
         // current state is not one the event is declared from.\n",
        t.event, t.destination
    ));
    out.push_str(&format!(
        "func ({RECEIVER} *{}) {}({}) error {{\n",
        t.machine, t.event, signature
    ));

    out.push_str(&format!("\tswitch {RECEIVER}.State {{\n"));
    out.push_str(&format!("\tcase {}:\n", t.guard.join(", ")));
    out.push_str("\tdefault:\n");
    out.push_str(&format!(
        "\t\treturn fmt.Errorf({}, {names}[{RECEIVER}.State])\n",
        quoted(&format!(
            "{}: transition not valid from current state %s",
            t.event
        ))
    ));
    out.push_str("\t}\n");

    if let Some(log) = &t.log {
        let mut args = vec![
            quoted("Start State"),
            format!("{names}[{RECEIVER}.State]"),
        ];
        for field in &log.fields {
            args.push(quoted(field));
            args.push(field.clone());
        }
        out.push_str(&format!(
            "\tslog.With({}).Info({})\n",
            args.join(", "),
            quoted(&log.message)
        ));
    }

    out.push_str(&format!(
        "\t{RECEIVER}.State = {}\n",
        t.destination_symbol
    ));
    out.push_str(&format!(
        "\tif {RECEIVER}.hook != nil {{\n\t\t{RECEIVER}.hook({})\n\t}}\n",
        t.event_symbol
    ));
    out.push_str("\treturn nil\n}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::definition::{Definition, EventDefinition, Param};
    use crate::synth::synthesize;

    fn emit(def: &Definition) -> Result<String> {
        GoEmitter.emit(&synthesize(def)?)
    }

    const ON_OFF: &str = r#"// Code generated by fsmgen. DO NOT EDIT.

package machines

import (
	"fmt"
)

const (
	STATE_IDLE uint8 = iota
	STATE_RUNNING
)

// NewSwitch returns a Switch in its initial state. hook, when non-nil,
// receives the ordinal of every event that completes a transition.
func NewSwitch(hook func(event uint8)) *Switch {
	return &Switch{State: STATE_IDLE, hook: hook}
}

// Switch is a generated state machine.
type Switch struct {
	State uint8
	hook  func(event uint8)
}

// SwitchStateNames maps state ordinals to their declared names.
var SwitchStateNames = map[uint8]string{
	0: "idle",
	1: "running",
}

const EVENT_START uint8 = 0

// start moves the machine to running. It fails without changing state when the
// current state is not one the event is declared from.
func (fsm *Switch) start() error {
	switch fsm.State {
	case STATE_IDLE:
	default:
		return fmt.Errorf("start: transition not valid from current state %s", SwitchStateNames[fsm.State])
	}
	fsm.State = STATE_RUNNING
	if fsm.hook != nil {
		fsm.hook(EVENT_START)
	}
	return nil
}

const EVENT_STOP uint8 = 1

// stop moves the machine to idle. It fails without changing state when the
// current state is not one the event is declared from.
func (fsm *Switch) stop() error {
	switch fsm.State {
	case STATE_RUNNING:
	default:
		return fmt.Errorf("stop: transition not valid from current state %s", SwitchStateNames[fsm.State])
	}
	fsm.State = STATE_IDLE
	if fsm.hook != nil {
		fsm.hook(EVENT_STOP)
	}
	return nil
}
"#;

    #[test]
    fn test_on_off_output() {
        let text = emit(&crate::definition::tests::on_off()).unwrap();
        assert_eq!(text, ON_OFF);
    }

    #[test]
    fn test_logging_and_params() {
        let def = Definition::new("Job", "jobs")
            .with_logging(true)
            .with_import("fmt")
            .with_import("time")
            .with_event(
                "retry",
                EventDefinition::new(["failed", "waiting"], "running")
                    .with_param(Param::new("retryCount", "int"))
                    .with_param(Param::new("reason", "string")),
            );
        let text = emit(&def).unwrap();

        assert!(text.contains("import (\n\t\"fmt\"\n\t\"log/slog\"\n\t\"time\"\n)\n"));
        assert!(text.contains("func (fsm *Job) retry(retryCount int, reason string) error {"));
        assert!(text.contains("\tcase STATE_FAILED, STATE_WAITING:\n"));
        assert!(text.contains(
            "\tslog.With(\"Start State\", JobStateNames[fsm.State], \"retryCount\", retryCount, \"reason\", reason).Info(\"transitioned to running\")\n"
        ));
        let log_at = text.find("slog.With").unwrap();
        let mutate_at = text.find("fsm.State = STATE_RUNNING").unwrap();
        assert!(log_at < mutate_at);
    }

    #[test]
    fn test_aliased_import_kept_verbatim() {
        let def = crate::definition::tests::on_off().with_import("str \"strings\"");
        let text = emit(&def).unwrap();
        assert!(text.contains("\tstr \"strings\"\n"));
    }

    #[test]
    fn test_digest_line() {
        let mut module = synthesize(&crate::definition::tests::on_off()).unwrap();
        module.header.source_digest = Some("blake2s-256:ab".to_string());
        let text = GoEmitter.emit(&module).unwrap();
        assert!(text.starts_with(
            "// Code generated by fsmgen. DO NOT EDIT.\n// Source: blake2s-256:ab\n\npackage machines\n"
        ));
    }

    #[test]
    fn test_reserved_names_rejected() {
        let def = Definition::new("M", "p").with_event("go", EventDefinition::new(["a"], "b"));
        assert!(matches!(emit(&def), Err(Error::Synthesis(_))));

        let def = Definition::new("M", "p").with_event("State", EventDefinition::new(["a"], "b"));
        assert!(matches!(emit(&def), Err(Error::Synthesis(_))));

        let def = Definition::new("M", "p").with_event(
            "start",
            EventDefinition::new(["a"], "b").with_param(Param::new("fsm", "int")),
        );
        assert!(matches!(emit(&def), Err(Error::Synthesis(_))));
    }

    #[test]
    fn test_params_cannot_shadow_body_identifiers() {
        for name in ["fmt", "slog", "nil", "JobStateNames", "STATE_RUNNING", "EVENT_RETRY"] {
            let def = Definition::new("Job", "jobs").with_logging(true).with_event(
                "retry",
                EventDefinition::new(["failed"], "running").with_param(Param::new(name, "int")),
            );
            assert!(
                matches!(emit(&def), Err(Error::Synthesis(_))),
                "parameter {} accepted",
                name
            );
        }
    }

    #[test]
    fn test_package_level_collisions() {
        let def = Definition::new("STATE_IDLE", "p")
            .with_event("start", EventDefinition::new(["idle"], "running"));
        assert!(matches!(emit(&def), Err(Error::SymbolCollision { .. })));
    }
}
