//! Prints one cycle of CPU time-accounting samples in an exposition-like
//! text form. On non-DragonFly hosts the platform collector reports itself
//! unavailable and is skipped.

use dragonfly_metrics::collector::{collect_all, register_platform_collectors, CollectorRegistry};
use dragonfly_metrics::metrics::Sample;
use dragonfly_metrics::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = CollectorRegistry::new();
    register_platform_collectors(&registry);

    let mut collectors = Vec::new();
    for (name, built) in registry.build_all() {
        match built {
            Ok(collector) => collectors.push(collector),
            Err(err) => eprintln!("skipping collector {name}: {err}"),
        }
    }

    let mut samples: Vec<Sample> = Vec::new();
    for outcome in collect_all(&collectors, &mut samples) {
        if let Err(err) = outcome.result {
            eprintln!("collector {} failed this cycle: {err}", outcome.name);
        }
    }

    for sample in &samples {
        let labels = sample
            .desc()
            .variable_labels()
            .iter()
            .zip(sample.label_values())
            .map(|(name, value)| format!("{name}=\"{value}\""))
            .collect::<Vec<_>>()
            .join(",");
        println!("{}{{{labels}}} {}", sample.desc().fq_name(), sample.value());
    }

    Ok(())
}
