use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mindmap_core::{ItemId, LayoutDirection, MindMapTree, load_tree, save_tree};
use mindmap_events::{Event, EventListener};
use mindmap_graph::{ConnectorRouter, Layout, LayoutConfig, Layouter, MindMapLayouter};
use mindmap_session::{Key, MindMapSession};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the positioned nodes of a mind map as JSON
    Layout {
        #[command(flatten)]
        input: LayoutInput,
    },
    /// Print the connector curves of a mind map as JSON
    Connectors {
        #[command(flatten)]
        input: LayoutInput,
    },
    /// Replay a key script against a mind map and print the result
    Keys {
        /// Path to the mind-map JSON file
        path: PathBuf,

        /// Item to start from (defaults to the root)
        #[arg(short, long)]
        active: Option<String>,

        /// Write the edited tree to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keys such as `tab`, `enter` or `right`; `=text` replaces the draft
        /// of the open label editor
        #[arg(required = true, allow_hyphen_values = true)]
        script: Vec<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct LayoutInput {
    /// Path to the mind-map JSON file
    pub path: PathBuf,

    /// Override the direction stored on the root
    #[arg(short, long)]
    pub direction: Option<LayoutDirection>,

    /// JSON file with layout constant overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Shift the layout so its bounds start at this margin (defaults to the
    /// config's `margin`)
    #[arg(short, long)]
    pub margin: Option<f32>,
}

/// One step of a key script.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Key(Key),
    Draft(String),
}

impl Step {
    pub fn parse(token: &str) -> Result<Self> {
        if let Some(text) = token.strip_prefix('=') {
            return Ok(Step::Draft(text.to_string()));
        }
        let key = token
            .parse::<Key>()
            .with_context(|| format!("Invalid script step {token:?}"))?;
        Ok(Step::Key(key))
    }
}

pub fn run<W: Write>(args: Args, out: &mut W) -> Result<()> {
    match args.command {
        Command::Layout { input } => {
            let layout = compute(&input)?;
            serde_json::to_writer_pretty(&mut *out, &layout)?;
        }
        Command::Connectors { input } => {
            let layout = compute(&input)?;
            let connectors = layout.connectors(&ConnectorRouter::default());
            serde_json::to_writer_pretty(&mut *out, &connectors)?;
        }
        Command::Keys {
            path,
            active,
            output,
            script,
        } => {
            let steps = script
                .iter()
                .map(|token| Step::parse(token))
                .collect::<Result<Vec<_>>>()?;
            let tree = read_tree(&path)?;
            let session = replay(tree, active.map(ItemId::from), &steps)?;

            if let Some(output) = output {
                fs::write(&output, save_tree(session.tree())?)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
            }
            let mut log = EventLog::default();
            session.events().dispatch_to(&mut log);
            let report = serde_json::json!({
                "active": session.active_id(),
                "events": log.events,
                "relayouts": log.relayouts,
                "tree": session.tree(),
            });
            serde_json::to_writer_pretty(&mut *out, &report)?;
        }
    }
    writeln!(out)?;
    Ok(())
}

/// Collects what a replayed session told its host.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
    /// Events after which a host would recompute the layout.
    pub relayouts: usize,
}

impl EventListener for EventLog {
    fn handle_event(&mut self, event: &Event) {
        if event.requires_layout() {
            self.relayouts += 1;
        }
        self.events.push(event.clone());
    }
}

/// Loads a persisted tree; recoverable problems are logged by the loader.
pub fn read_tree(path: &Path) -> Result<MindMapTree> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let loaded =
        load_tree(&json).with_context(|| format!("Failed to load {}", path.display()))?;
    if !loaded.issues.is_empty() {
        tracing::info!(
            path = %path.display(),
            issues = loaded.issues.len(),
            "loaded with repairs"
        );
    }
    Ok(loaded.tree)
}

pub fn read_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    LayoutConfig::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))
}

fn compute(input: &LayoutInput) -> Result<Layout> {
    let tree = read_tree(&input.path)?;
    let config = read_config(input.config.as_deref())?;
    let margin = input.margin.unwrap_or(config.margin);
    let layouter = MindMapLayouter::new(config);
    let direction = input.direction.unwrap_or_else(|| tree.layout_direction());
    Ok(layouter.execute(tree.root(), direction).normalized(margin))
}

/// Runs `steps` in a fresh session and commits whatever edit is left open.
pub fn replay(tree: MindMapTree, active: Option<ItemId>, steps: &[Step]) -> Result<MindMapSession> {
    let active = active.unwrap_or_else(|| tree.root_id().clone());
    let mut session = MindMapSession::new(tree);
    if !session.activate(&active) {
        bail!("No item with id {active}");
    }

    for step in steps {
        match step {
            Step::Key(key) => {
                let outcome = session.handle_key(*key);
                tracing::debug!(?key, ?outcome, "replayed key");
            }
            Step::Draft(text) if session.editing_id().is_some() => {
                session.update_draft(text.as_str());
            }
            Step::Draft(text) => {
                tracing::warn!(draft = %text, "no label editor open, draft ignored");
            }
        }
    }
    session.blur();
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_core::Item;
    use serde_json::Value;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "id": "r",
        "label": "Root",
        "children": [
            { "id": "a", "label": "Alpha", "children": [] },
            { "id": "b", "label": "Beta", "children": [] }
        ]
    }"#;

    fn write_sample(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("map.json");
        fs::write(&path, SAMPLE).unwrap();
        path
    }

    fn run_to_json(argv: &[&str]) -> Value {
        let args = Args::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        run(args, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_layout_command_prints_every_node() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir);
        let path = path.to_str().unwrap();

        let value = run_to_json(&["mindmap", "layout", path, "--direction", "tb"]);
        assert_eq!(value["direction"], "TopToBottom");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(value["nodes"][0]["id"], "r");
        assert_eq!(value["nodes"][0]["color"], "#34495e");
    }

    #[test]
    fn test_layout_margin_moves_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir);
        let path = path.to_str().unwrap();

        let value = run_to_json(&["mindmap", "layout", path, "--margin", "50"]);
        let min = &value["bounds"]["min"];
        assert!((min["x"].as_f64().unwrap() - 50.0).abs() < 0.001);
        assert!((min["y"].as_f64().unwrap() - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_margin_falls_back_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir);
        let path = path.to_str().unwrap();
        let config = dir.path().join("layout.json");
        fs::write(&config, r#"{ "margin": 10.0 }"#).unwrap();
        let config = config.to_str().unwrap();

        let min_of = |value: &Value| {
            let min = &value["bounds"]["min"];
            (min["x"].as_f64().unwrap(), min["y"].as_f64().unwrap())
        };

        let (x, y) = min_of(&run_to_json(&["mindmap", "layout", path, "--config", config]));
        assert!((x - 10.0).abs() < 0.001 && (y - 10.0).abs() < 0.001);

        let (x, y) = min_of(&run_to_json(&[
            "mindmap", "layout", path, "--config", config, "--margin", "25",
        ]));
        assert!((x - 25.0).abs() < 0.001 && (y - 25.0).abs() < 0.001);

        let (x, y) = min_of(&run_to_json(&["mindmap", "layout", path]));
        let default = f64::from(LayoutConfig::default().margin);
        assert!((x - default).abs() < 0.001 && (y - default).abs() < 0.001);
    }

    #[test]
    fn test_config_overrides_level_gap() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir);
        let config = dir.path().join("layout.json");
        fs::write(&config, r#"{ "levelGap": 100.0 }"#).unwrap();

        let value = run_to_json(&[
            "mindmap",
            "layout",
            path.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ]);
        let root = &value["nodes"][0];
        let child = &value["nodes"][1];
        let gap = child["x"].as_f64().unwrap()
            - (root["x"].as_f64().unwrap() + root["width"].as_f64().unwrap());
        assert!((gap - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_connectors_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir);

        let value = run_to_json(&["mindmap", "connectors", path.to_str().unwrap()]);
        let connectors = value.as_array().unwrap();
        assert_eq!(connectors.len(), 2);
        assert_eq!(connectors[0]["parentId"], "r");
        assert_eq!(connectors[1]["childId"], "b");
    }

    #[test]
    fn test_keys_command_writes_edited_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir);
        let output = dir.path().join("edited.json");

        let value = run_to_json(&[
            "mindmap",
            "keys",
            path.to_str().unwrap(),
            "--active",
            "a",
            "--output",
            output.to_str().unwrap(),
            "tab",
            "=Detail",
            "enter",
        ]);
        assert_eq!(value["tree"]["children"][0]["children"][0]["label"], "Detail");

        let events = value["events"].as_array().unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(events[1]["ItemAdded"]["parent_id"], "a");
        assert_eq!(events[5]["EditCommitted"]["label"], "Detail");
        // ItemAdded, ItemRenamed and EditCommitted
        assert_eq!(value["relayouts"], 3);

        let saved = read_tree(&output).unwrap();
        let alpha = saved.item(&ItemId::from("a")).unwrap();
        assert_eq!(alpha.children[0].label, "Detail");
    }

    #[test]
    fn test_event_log_counts_relayouts() {
        let tree = MindMapTree::from_root(Item::new("r", "Root"));
        let session = replay(tree, None, &[Step::Key(Key::Tab)]).unwrap();

        let mut log = EventLog::default();
        session.events().dispatch_to(&mut log);
        assert!(matches!(log.events[0], Event::ActiveChanged { .. }));
        assert!(matches!(log.events.last(), Some(Event::EditCommitted { .. })));
        assert_eq!(log.relayouts, 2);
        assert!(session.events().drain().is_empty());
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        assert!(Step::parse("F5").is_err());
        assert_eq!(Step::parse("=").unwrap(), Step::Draft(String::new()));
        assert_eq!(Step::parse("left").unwrap(), Step::Key(Key::ArrowLeft));
    }

    #[test]
    fn test_replay_rejects_unknown_active() {
        let tree = MindMapTree::from_root(Item::new("r", "Root"));
        assert!(replay(tree, Some(ItemId::from("zz")), &[]).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_tree(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("here.json"));
    }
}
