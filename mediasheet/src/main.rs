use clap::{Parser, Subcommand};
use mediasheet_lib::breakpoints::merge::build_merged_breakpoint_ids;
use mediasheet_lib::breakpoints::{group_breakpoints, Breakpoint};
use mediasheet_lib::canvas::{calc_canvas_width, CanvasWidthInput};
use mediasheet_lib::style::owned_css::StyleDocument;
use mediasheet_lib::style::render::{render_styles, StyleDecl};
use mediasheet_lib::style::simulator::MediaSimulator;
use serde_json::Value;
use std::fs;
use std::process;

#[derive(Parser)]
#[command(name = "mediasheet")]
#[command(about = "Breakpoint ordering, canvas sizing and CSS generation")]
struct Args {
    /// Log debug output (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render style declarations to CSS.
    Css {
        /// JSON array of breakpoints.
        breakpoints: String,
        /// JSON array of style declarations.
        styles: String,
    },
    /// Print breakpoints in display order.
    Group {
        /// JSON array of breakpoints.
        breakpoints: String,
    },
    /// Compute the canvas width for a selected breakpoint.
    CanvasWidth {
        /// JSON array of breakpoints.
        breakpoints: String,
        /// Id of the selected breakpoint.
        #[arg(long)]
        selected: String,
        #[arg(long)]
        workspace_width: u32,
        /// Current canvas width, if the canvas was already sized.
        #[arg(long)]
        canvas_width: Option<u32>,
    },
    /// Map fragment breakpoints onto existing ones.
    Merge {
        /// JSON array of fragment breakpoints.
        fragment: String,
        /// JSON array of existing breakpoints.
        existing: String,
    },
    /// Print a stylesheet as it would apply under a media condition.
    Simulate {
        /// CSS file.
        stylesheet: String,
        /// Condition such as `prefers-color-scheme:dark`.
        condition: String,
    },
}

fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Error reading {}: {}", path, e))
}

fn read_breakpoints(path: &str) -> Result<Vec<Breakpoint>, String> {
    serde_json::from_str(&read_file(path)?)
        .map_err(|e| format!("Error parsing breakpoints in {}: {}", path, e))
}

fn to_json(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Error writing JSON: {}", e))
}

/// Runs one subcommand and returns what it prints on stdout.
fn run(command: Command) -> Result<String, String> {
    match command {
        Command::Css {
            breakpoints,
            styles,
        } => {
            let breakpoints = read_breakpoints(&breakpoints)?;
            let decls: Vec<StyleDecl> = serde_json::from_str(&read_file(&styles)?)
                .map_err(|e| format!("Error parsing styles in {}: {}", styles, e))?;
            render_styles(&breakpoints, &decls)
                .map(|rendered| rendered.css_text)
                .map_err(|e| format!("Error rendering styles: {}", e))
        }
        Command::Group { breakpoints } => {
            let breakpoints = read_breakpoints(&breakpoints)?;
            let grouped = group_breakpoints(&breakpoints);
            to_json(&serde_json::json!({
                "widthBased": grouped.width_based,
                "custom": grouped.custom,
            }))
        }
        Command::CanvasWidth {
            breakpoints,
            selected,
            workspace_width,
            canvas_width,
        } => {
            let breakpoints = read_breakpoints(&breakpoints)?;
            let Some(selected) = breakpoints.iter().find(|b| b.id == selected) else {
                return Err(format!("Unknown breakpoint: {}", selected));
            };
            let width = calc_canvas_width(CanvasWidthInput {
                breakpoints: &breakpoints,
                selected,
                workspace_width,
                canvas_width,
            });
            Ok(width.to_string())
        }
        Command::Merge { fragment, existing } => {
            let fragment = read_breakpoints(&fragment)?;
            let existing = read_breakpoints(&existing)?;
            let merged = build_merged_breakpoint_ids(&fragment, &existing);
            to_json(&serde_json::json!(merged))
        }
        Command::Simulate {
            stylesheet,
            condition,
        } => {
            let mut document = StyleDocument::new();
            document
                .add_css(&read_file(&stylesheet)?)
                .map_err(|e| format!("Error in {}: {}", stylesheet, e))?;
            let mut simulator = MediaSimulator::new();
            simulator.simulate(&mut document, Some(&condition));
            if !simulator.is_active() {
                log::warn!("no media rule reacts to '{}'", condition);
            }
            let mut output = String::new();
            for sheet in &document.sheets {
                match sheet.to_css() {
                    Ok(css) => output.push_str(&css),
                    Err(e) => log::warn!("{}", e),
                }
            }
            Ok(output)
        }
    }
}

fn main() {
    let args: Args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(args.command) {
        Ok(output) => println!("{}", output),
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const BREAKPOINTS: &str = r#"[
        {"id": "base", "label": "Base"},
        {"id": "desktop", "label": "Desktop", "minWidth": 1280},
        {"id": "tablet", "label": "Tablet", "maxWidth": 991},
        {"id": "dark", "label": "Dark", "condition": "prefers-color-scheme:dark"}
    ]"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_css_command_renders_in_cascade_order() {
        let dir = TempDir::new().unwrap();
        let breakpoints = write(&dir, "breakpoints.json", BREAKPOINTS);
        let styles = write(
            &dir,
            "styles.json",
            r#"[
                {"breakpointId": "desktop", "styleSourceId": "box", "property": "display",
                 "value": {"type": "keyword", "value": "grid"}},
                {"breakpointId": "base", "styleSourceId": "box", "property": "display",
                 "value": {"type": "keyword", "value": "flex"}}
            ]"#,
        );

        let css = run(Command::Css {
            breakpoints,
            styles,
        })
        .unwrap();
        let expected = "\
@media all {
  .s1 { display: flex }
}

@media (min-width: 1280px) {
  .s0 { display: grid }
}";
        assert_eq!(css, expected);
    }

    #[test]
    fn test_group_command() {
        let dir = TempDir::new().unwrap();
        let breakpoints = write(&dir, "breakpoints.json", BREAKPOINTS);

        let output = run(Command::Group { breakpoints }).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        let ids = |key: &str| -> Vec<String> {
            value[key]
                .as_array()
                .unwrap()
                .iter()
                .map(|b| b["id"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(ids("widthBased"), vec!["desktop", "base", "tablet"]);
        assert_eq!(ids("custom"), vec!["dark"]);
    }

    #[test]
    fn test_canvas_width_command() {
        let dir = TempDir::new().unwrap();
        let breakpoints = write(&dir, "breakpoints.json", BREAKPOINTS);
        let canvas = |selected: &str| {
            run(Command::CanvasWidth {
                breakpoints: breakpoints.clone(),
                selected: selected.to_string(),
                workspace_width: 1200,
                canvas_width: None,
            })
        };

        assert_eq!(canvas("tablet"), Ok("320".to_string()));
        assert_eq!(canvas("base"), Ok("1199".to_string()));
        assert_eq!(canvas("dark"), Ok("1199".to_string()));
        assert_eq!(
            canvas("phone"),
            Err("Unknown breakpoint: phone".to_string())
        );
    }

    #[test]
    fn test_merge_command() {
        let dir = TempDir::new().unwrap();
        let existing = write(&dir, "existing.json", BREAKPOINTS);
        let fragment = write(
            &dir,
            "fragment.json",
            r#"[
                {"id": "f-tablet", "label": "Tablet", "maxWidth": 991},
                {"id": "f-huge", "label": "Huge", "minWidth": 2560}
            ]"#,
        );

        let output = run(Command::Merge { fragment, existing }).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value, serde_json::json!({"f-tablet": "tablet"}));
    }

    #[test]
    fn test_simulate_command() {
        let dir = TempDir::new().unwrap();
        let stylesheet = write(
            &dir,
            "site.css",
            "@media (prefers-color-scheme: dark) { .s0 { color: white; } }",
        );

        let output = run(Command::Simulate {
            stylesheet,
            condition: "prefers-color-scheme:light".to_string(),
        })
        .unwrap();
        assert!(output.contains("@media not all"));
        assert!(!output.contains("prefers-color-scheme"));
    }

    #[test]
    fn test_missing_and_malformed_input() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(!missing.exists());
        let error = run(Command::Group {
            breakpoints: missing.to_string_lossy().into_owned(),
        })
        .unwrap_err();
        assert!(error.starts_with("Error reading"));

        let broken = write(&dir, "broken.json", "[{\"id\": 1}]");
        let error = run(Command::Group {
            breakpoints: broken,
        })
        .unwrap_err();
        assert!(error.starts_with("Error parsing breakpoints"));
    }
}
