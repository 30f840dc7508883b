use shape3d_lib::command::execute_json_batch;
use shape3d_lib::harness::EditorHarness;
use shape3d_lib::settings::EditorSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shape3d_editor=info,shape3d_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = parse_script_arg() else {
        eprintln!("Usage: shape3d-editor --script <commands.json>");
        std::process::exit(2);
    };

    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read script file {path}: {e}");
            std::process::exit(1);
        }
    };

    let settings = EditorSettings::load();
    let mut harness = EditorHarness::with_settings(&settings);

    match execute_json_batch(&mut harness, &json) {
        Ok(responses) => {
            tracing::info!("Ran {} commands from {path}", responses.len());
            for response in responses {
                match serde_json::to_string(&response) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::error!("Failed to serialize response: {e}"),
                }
            }
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn parse_script_arg() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--script" && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}
