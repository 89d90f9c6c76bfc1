use clap::{Parser, ValueEnum};
use hikaku::prelude::*;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MatchPolicyCli {
    ChildKinds,
    FullShape,
}

impl From<MatchPolicyCli> for MatchPolicy {
    fn from(policy: MatchPolicyCli) -> Self {
        match policy {
            MatchPolicyCli::ChildKinds => MatchPolicy::ChildKinds,
            MatchPolicyCli::FullShape => MatchPolicy::FullShape,
        }
    }
}

/// Scores a generated workflow against a reference workflow
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the generated workflow JSON file
    generated_path: String,
    /// Path to the reference workflow JSON file
    reference_path: String,

    /// Print the full report as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Weight of the structural score in the overall score
    #[arg(long, default_value_t = 0.5)]
    structural_weight: f64,

    /// Weight of the semantic score in the overall score
    #[arg(long, default_value_t = 0.5)]
    semantic_weight: f64,

    /// What two subtrees must share to count as a structural match
    #[arg(long, value_enum, default_value = "child-kinds")]
    match_policy: MatchPolicyCli,

    /// Print both trees before the report
    #[arg(long)]
    show_trees: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let total_start = Instant::now();
    let generated = WorkflowDocument::from_file(&cli.generated_path)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    let reference = WorkflowDocument::from_file(&cli.reference_path)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    if cli.show_trees {
        print_tree("Generated", &generated);
        print_tree("Reference", &reference);
    }

    let comparator = Comparator::builder()
        .with_structural_config(StructuralConfig {
            match_policy: cli.match_policy.into(),
            ..StructuralConfig::default()
        })
        .with_overall_weights(OverallWeights {
            structural: cli.structural_weight,
            semantic: cli.semantic_weight,
        })
        .build();

    let report = comparator
        .compare_documents(&generated, &reference)
        .unwrap_or_else(|e| exit_with_error(&format!("Comparison failed: {}", e)));

    if cli.json {
        let json = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize report: {}", e)));
        println!("{}", json);
    } else {
        println!("{}", report.summary);
        println!("Compared in {:?}", total_start.elapsed());
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_tree(label: &str, document: &WorkflowDocument) {
    let tree = TreeBuilder::default()
        .build(document.as_value())
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid {} workflow: {}", label, e)));
    println!("--- {} workflow '{}' ---", label, tree.name);
    println!("{}", DisplayTree { node: &tree.root });
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
