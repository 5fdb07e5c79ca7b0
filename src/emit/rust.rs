//! Rust emitter

use crate::Result;
use crate::definition::UintWidth;
use crate::emit::{
    Emitter, GENERATED_BANNER, Target, ensure_distinct, ensure_not_reserved, quoted,
};
use crate::synth::ir::*;

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield",
];

const LOGGING_IMPORT: &str = "tracing::info";

/// Log field carrying the state the transition started from
const START_FIELD: &str = "start_state";

pub struct RustEmitter;

impl Emitter for RustEmitter {
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
    let reserved =
        |role: &str, name: &str| ensure_not_reserved(Target::Rust, role, name, KEYWORDS);

    // Every `pub const` shares the module namespace.
    let table = state_names(&module.machine.name);
    let items = top_level_items(module, &table);
    ensure_distinct(items.iter().copied())?;

    // A parameter named after a constant would bind in the guard pattern.
    let mut param_reserved: Vec<&str> = items.iter().map(|(symbol, _)| *symbol).collect();
    param_reserved.push(START_FIELD);

    reserved("machine name", &module.machine.name)?;
    for t in &module.transitions {
        reserved("event", &t.event)?;
        ensure_not_reserved(Target::Rust, "event", &t.event, &["new"])?;
        for p in &t.params {
            reserved("parameter", &p.name)?;
            ensure_not_reserved(Target::Rust, "parameter", &p.name, &param_reserved)?;
        }
    }
    Ok(())
}

/// `(constant, declared name)` for the lookup table, states and events
fn top_level_items<'a>(module: &'a MachineModule, table: &'a str) -> Vec<(&'a str, &'a str)> {
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

    std::iter::once((table, module.machine.name.as_str()))
        .chain(states)
        .chain(events)
        .collect()
}

fn type_name(width: UintWidth) -> String {
    format!("u{}", width.bits())
}

/// `TrafficLight` -> `TRAFFIC_LIGHT`
fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        out.push(c.to_ascii_uppercase());
    }
    out
}

fn state_names(machine: &str) -> String {
    format!("{}_STATE_NAMES", screaming_snake(machine))
}

fn error_type(machine: &str) -> String {
    format!("{}TransitionError", machine)
}

fn header(out: &mut String, header: &Header) {
    out.push_str(GENERATED_BANNER);
    out.push('\n');
    if let Some(digest) = &header.source_digest {
        out.push_str(&format!("// Source: {}\n", digest));
    }
    out.push_str(&format!("//\n// Module: {}\n", header.package));

    let mut paths: Vec<&str> = Vec::new();
    for import in &header.imports {
        let path = match import {
            Import::Logging => LOGGING_IMPORT,
            Import::Module(m) => m.trim_start_matches("use ").trim_end_matches(';').trim(),
        };
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    if !paths.is_empty() {
        out.push('\n');
    }
    for path in paths {
        out.push_str(&format!("use {};\n", path));
    }
}

fn state_enum(out: &mut String, states: &StateEnum) {
    out.push('\n');
    for constant in &states.constants {
        out.push_str(&format!(
            "pub const {}: {} = {};\n",
            constant.symbol,
            type_name(states.width),
            constant.ordinal
        ));
    }
}

fn constructor(out: &mut String, ctor: &Constructor) {
    out.push_str(&format!("\nimpl {} {{\n", ctor.machine));
    out.push_str(
        "    /// Returns a machine in its initial state. `hook`, when set, receives the\n\
         \x20   /// ordinal of every event that completes a transition.\n",
    );
    out.push_str(&format!(
        "    pub fn new(hook: Option<fn({})>) -> Self {{\n",
        type_name(ctor.event_width)
    ));
    out.push_str(&format!(
        "        Self {{\n            state: {},\n            hook,\n        }}\n    }}\n}}\n",
        ctor.initial_state
    ));
}

fn machine_type(out: &mut String, machine: &MachineType) {
    let name = &machine.name;
    let error = error_type(name);
    let names = state_names(name);

    out.push_str("\n/// Generated state machine.\n#[derive(Debug, Clone, Copy)]\n");
    out.push_str(&format!("pub struct {name} {{\n"));
    out.push_str(&format!(
        "    pub state: {},\n    hook: Option<fn({})>,\n}}\n",
        type_name(machine.state_width),
        type_name(machine.event_width)
    ));

    out.push_str(
        "\n/// A rejected transition: the event is not valid from the current state.\n\
         #[derive(Debug, Clone, Copy, PartialEq, Eq)]\n",
    );
    out.push_str(&format!(
        "pub struct {error} {{\n    pub event: &'static str,\n    pub state: {},\n}}\n",
        type_name(machine.state_width)
    ));
    out.push_str(&format!(
        "\nimpl std::fmt::Display for {error} {{\n\
         \x20   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {{\n\
         \x20       write!(\n\
         \x20           f,\n\
         \x20           \"{{}}: transition not valid from current state {{}}\",\n\
         \x20           self.event, {names}[self.state as usize]\n\
         \x20       )\n\
         \x20   }}\n\
         }}\n"
    ));
    out.push_str(&format!("\nimpl std::error::Error for {error} {{}}\n"));
}

fn lookup(out: &mut String, table: &LookupTable) {
    out.push_str("\n/// State ordinal to declared name.\n");
    out.push_str(&format!(
        "pub const {}: [&str; {}] = [\n",
        state_names(&table.machine),
        table.entries.len()
    ));
    for (ordinal, name) in &table.entries {
        out.push_str(&format!("    {}, // {}\n", quoted(name), ordinal));
    }
    out.push_str("];\n");
}

fn transition_fn(out: &mut String, t: &TransitionFn) {
    let names = state_names(&t.machine);
    let signature: String = t
        .params
        .iter()
        .map(|p| format!(", {}: {}", p.name, p.param_type))
        .collect();

    out.push_str(&format!(
        "\npub const {}: {} = {};\n",
        t.event_symbol,
        type_name(t.event_width),
        t.ordinal
    ));
    out.push_str(&format!("\nimpl {} {{\n", t.machine));
    out.push_str(&format!(
        "    /// Moves the machine to `{}`. Fails without changing state when the\n\
         \x20   /// current state is not one the event is declared from.\n",
        t.destination
    ));

    let mut lints = Vec::new();
    let mixed_case = |s: &str| s.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case(&t.event) || t.params.iter().any(|p| mixed_case(&p.name)) {
        lints.push("non_snake_case");
    }
    if t.log.is_none() && !t.params.is_empty() {
        lints.push("unused_variables");
    }
    if !lints.is_empty() {
        out.push_str(&format!("    #[allow({})]\n", lints.join(", ")));
    }

    out.push_str(&format!(
        "    pub fn {}(&mut self{}) -> Result<(), {}> {{\n",
        t.event,
        signature,
        error_type(&t.machine)
    ));
    out.push_str(&format!(
        "        if !matches!(self.state, {}) {{\n",
        t.guard.join(" | ")
    ));
    out.push_str(&format!(
        "            return Err({} {{\n                event: {},\n                state: self.state,\n            }});\n        }}\n",
        error_type(&t.machine),
        quoted(&t.event)
    ));

    if let Some(log) = &t.log {
        let mut args = vec![format!("{START_FIELD} = {names}[self.state as usize]")];
        for field in &log.fields {
            args.push(format!("{field} = ?{field}"));
        }
        args.push(quoted(&log.message));
        out.push_str(&format!("        info!({});\n", args.join(", ")));
    }

    out.push_str(&format!(
        "        self.state = {};\n",
        t.destination_symbol
    ));
    out.push_str(&format!(
        "        if let Some(hook) = self.hook {{\n            hook({});\n        }}\n",
        t.event_symbol
    ));
    out.push_str("        Ok(())\n    }\n}\n");
}
