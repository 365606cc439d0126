use archicg_core::vocabulary::{layer_of, relation_kind_for_code};
use archicg_core::{AllowanceTable, Document, Editor, EditorConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Model(archicg_core::Error),
    Json(serde_json::Error),
    Violations(usize),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Model(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Violations(n) => write!(f, "{n} relationship violation(s)"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<archicg_core::Error> for CliError {
    fn from(value: archicg_core::Error) -> Self {
        Self::Model(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Validate,
    Stats,
    Normalize,
    Matrix,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    no_enforce: bool,
    out: Option<String>,
    source_kind: Option<String>,
    target_kind: Option<String>,
}

fn usage() -> &'static str {
    "archicg-cli\n\
\n\
USAGE:\n\
  archicg-cli validate [--pretty] [--no-enforce] [<path>|-]\n\
  archicg-cli stats [--pretty] [<path>|-]\n\
  archicg-cli normalize [--pretty] [--out <path>] [<path>|-]\n\
  archicg-cli matrix <source-kind> <target-kind>\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - validate exits 3 when relationship violations are found; --no-enforce\n\
    reports recoveries only.\n\
  - normalize re-emits the model: blank nodes materialized for dangling\n\
    references, collapsed-edge bundles flattened back to their members.\n\
  - matrix prints the relationship kinds allowed between two element kinds.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut positional: Vec<String> = Vec::new();

    let mut it = argv.iter().skip(1);
    let Some(cmd) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    args.command = match cmd.as_str() {
        "--help" | "-h" => return Err(CliError::Usage(usage())),
        "validate" => Command::Validate,
        "stats" => Command::Stats,
        "normalize" => Command::Normalize,
        "matrix" => Command::Matrix,
        _ => return Err(CliError::Usage(usage())),
    };

    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pretty" => args.pretty = true,
            "--no-enforce" => args.no_enforce = true,
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            value => positional.push(value.to_string()),
        }
    }

    match args.command {
        Command::Matrix => {
            let mut it = positional.into_iter();
            args.source_kind = it.next();
            args.target_kind = it.next();
            if args.source_kind.is_none() || args.target_kind.is_none() || it.next().is_some() {
                return Err(CliError::Usage(usage()));
            }
        }
        _ => {
            if positional.len() > 1 {
                return Err(CliError::Usage(usage()));
            }
            args.input = positional.into_iter().next();
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn open(text: &str) -> Result<(Editor, Vec<String>), CliError> {
    let doc = Document::from_json(text)?;
    let (editor, report) = Editor::from_document(&doc, EditorConfig::default())?;
    Ok((editor, report.blank_nodes))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViolationOut {
    edge_id: String,
    relation: String,
    source_kind: String,
    target_kind: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateOut {
    blank_nodes: Vec<String>,
    violations: Vec<ViolationOut>,
}

fn run_validate(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let (editor, blank_nodes) = open(&text)?;

    let violations: Vec<ViolationOut> = if args.no_enforce {
        Vec::new()
    } else {
        editor
            .relationship_violations()
            .into_iter()
            .map(|v| ViolationOut {
                edge_id: v.edge_id,
                relation: v.relation,
                source_kind: v.source_kind,
                target_kind: v.target_kind,
            })
            .collect()
    };

    let count = violations.len();
    write_json(
        &ValidateOut {
            blank_nodes,
            violations,
        },
        args.pretty,
    )?;
    if count > 0 {
        return Err(CliError::Violations(count));
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOut {
    nodes: usize,
    edges: usize,
    compound_nodes: usize,
    max_nesting_depth: usize,
    components: usize,
    layers: BTreeMap<&'static str, usize>,
}

fn run_stats(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let (editor, _) = open(&text)?;
    let graph = editor.graph();

    let mut layers: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut max_depth = 0usize;
    for id in graph.node_ids() {
        if let Some(node) = graph.node(&id) {
            *layers.entry(layer_of(&node.kind).as_str()).or_insert(0) += 1;
        }
        max_depth = max_depth.max(graph.depth(&id));
    }

    write_json(
        &StatsOut {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            compound_nodes: graph.compound_node_ids().len(),
            max_nesting_depth: max_depth,
            components: graph.component_count(),
            layers,
        },
        args.pretty,
    )
}

fn run_normalize(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let (editor, _) = open(&text)?;
    let doc = editor.to_document();
    let json = if args.pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    match args.out.as_deref() {
        None | Some("-") => println!("{json}"),
        Some(path) => std::fs::write(path, json)?,
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatrixOut<'a> {
    source_kind: &'a str,
    target_kind: &'a str,
    allowed: Vec<&'static str>,
}

fn run_matrix(args: &Args) -> Result<(), CliError> {
    let source = args.source_kind.as_deref().unwrap_or_default();
    let target = args.target_kind.as_deref().unwrap_or_default();
    let allowed: Vec<&'static str> = match AllowanceTable::allowed_codes(source, target) {
        Some(codes) => codes.chars().filter_map(relation_kind_for_code).collect(),
        None => return Err(CliError::Usage("unknown element kind")),
    };
    write_json(
        &MatrixOut {
            source_kind: source,
            target_kind: target,
            allowed,
        },
        args.pretty,
    )
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Validate => run_validate(&args),
        Command::Stats => run_stats(&args),
        Command::Normalize => run_normalize(&args),
        Command::Matrix => run_matrix(&args),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Violations(n)) => {
            eprintln!("{}", CliError::Violations(n));
            std::process::exit(3);
        }
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
