//! Tabletop Grounding - interactive demo
//!
//! Reads pick-and-place commands from stdin against a three-cube table and
//! prints the decision, tokens and control vectors. After each plan the
//! scene is re-perceived with the picked cube at its drop position.
//!
//! Uses the HTTP encoder when EMBEDDING_API_URL is set, the offline hashing
//! encoder otherwise. GROUNDING_CONFIG may point at a TOML config file.

use std::io::{self, Write};
use std::path::Path;

use tabletop_grounding::command::{CommandOutcome, Orchestrator};
use tabletop_grounding::core::error::Result;
use tabletop_grounding::core::{GroundingConfig, ObjectDescriptor, ObjectId, Position, SceneSnapshot};
use tabletop_grounding::embedding::{HashingEncoder, HttpEncoder, TextEncoder};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("tabletop_grounding=debug")
        .init();

    let config = match std::env::var("GROUNDING_CONFIG") {
        Ok(path) => GroundingConfig::load(Path::new(&path))?,
        Err(_) => GroundingConfig::default(),
    };

    let encoder: Box<dyn TextEncoder> = if std::env::var("EMBEDDING_API_URL").is_ok() {
        Box::new(HttpEncoder::from_env(&config.encoder)?)
    } else {
        tracing::warn!("EMBEDDING_API_URL not set - using offline hashing encoder");
        Box::new(HashingEncoder::new(config.encoder.hashing_dim))
    };

    let orchestrator = Orchestrator::new(encoder.as_ref(), &config)?;
    let mut scene = initial_scene();

    println!("\n=== TABLETOP GROUNDING ===");
    println!("Encoder: {}", encoder.model_name());
    println!();
    println!("Commands:");
    println!("  scene / s   - Show the current objects");
    println!("  quit / q    - Exit");
    println!("  <any text>  - Pick-and-place command, e.g.");
    println!("                \"put the blue block on the green cube\"");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "scene" || input == "s" {
            display_scene(&scene);
            continue;
        }

        match orchestrator.handle(input, &scene) {
            Ok(outcome) => {
                display_outcome(&outcome, &scene);
                if let Some(next) = apply_outcome(&outcome, &scene) {
                    scene = next;
                }
            }
            Err(e) if e.is_encoder_failure() => {
                println!("Encoder failed, command dropped: {}", e);
            }
            Err(e) => println!("Grounding failed: {}", e),
        }
    }

    println!("\nGoodbye! Final scene at cycle {}.", scene.cycle);
    Ok(())
}

fn initial_scene() -> SceneSnapshot {
    SceneSnapshot::new(
        0,
        vec![
            ObjectDescriptor::new(ObjectId(1), "red", Position::new(0.55, -0.15, 0.03), 0.0),
            ObjectDescriptor::new(ObjectId(2), "green", Position::new(0.55, 0.0, 0.03), 0.0),
            ObjectDescriptor::new(ObjectId(3), "blue", Position::new(0.55, 0.15, 0.03), 0.0),
        ],
    )
}

fn display_scene(scene: &SceneSnapshot) {
    println!("Cycle {}:", scene.cycle);
    for obj in scene.objects() {
        println!(
            "  {} {:<6} at ({:.2}, {:.2}, {:.2}) yaw {:.2}",
            obj.id, obj.name, obj.position.x, obj.position.y, obj.position.z, obj.yaw
        );
    }
}

fn display_outcome(outcome: &CommandOutcome, scene: &SceneSnapshot) {
    let decision = &outcome.decision;
    let name_of = |id: ObjectId| scene.get(id).map(|o| o.name.as_str()).unwrap_or("?");

    println!();
    println!("Decision:");
    println!("  Pick phrase:  {:?}", decision.phrases.pick);
    println!("  Place phrase: {:?}", decision.phrases.place);
    match decision.pick {
        Some(id) => println!(
            "  Pick:  {} ({}) via {:?}",
            name_of(id),
            id,
            decision.diagnostics.pick_strategy
        ),
        None => println!("  Pick:  none"),
    }
    match (decision.ground, decision.place_object()) {
        (true, _) => println!("  Place: ground"),
        (false, Some(id)) => println!(
            "  Place: {} ({}) via {:?}",
            name_of(id),
            id,
            decision.diagnostics.place_strategy
        ),
        (false, None) => println!("  Place: none (default drop)"),
    }
    if decision.diagnostics.collision_resolved {
        println!("  (place collided with pick and was re-ranked)");
    }

    let Some(plan) = &outcome.plan else {
        println!("Nothing to do.");
        return;
    };

    println!("Tokens:");
    println!("  {}", plan.pick.token_strings().join(" "));
    println!("  {}", plan.place.token_strings().join(" "));
    println!("Vectors:");
    for v in plan.vectors() {
        println!("  {}", v);
    }
}

/// Next perception cycle with the picked cube at its drop position
fn apply_outcome(outcome: &CommandOutcome, scene: &SceneSnapshot) -> Option<SceneSnapshot> {
    let plan = outcome.plan.as_ref()?;
    let picked = outcome.decision.pick?;

    let objects = scene
        .objects()
        .iter()
        .map(|o| {
            let mut o = o.clone();
            if o.id == picked {
                o.position = plan.drop_position;
            }
            o
        })
        .collect();

    Some(scene.succeed(objects))
}
