// src/cli/predictions.rs — Show the latest stored recommendations

use crate::infra::config::Config;
use crate::store::{PredictionRow, StoreHandle};

pub async fn show_predictions(config: &Config, store: &StoreHandle, json: bool) -> anyhow::Result<()> {
    let rows = store.query_latest_predictions(config.device()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&rows))?);
        return Ok(());
    }

    let Some(first) = rows.first() else {
        println!("No recommendations stored for {} yet.", config.device());
        return Ok(());
    };

    println!(
        "Latest batch '{}' for {} (written {})",
        first.run_key,
        config.device(),
        first.timestamp
    );
    println!();
    for row in &rows {
        println!("{}", row.recommendation);
        println!();
    }
    Ok(())
}

fn to_json(rows: &[PredictionRow]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let r = &row.recommendation;
            serde_json::json!({
                "id": row.id,
                "run_key": row.run_key,
                "rank": r.rank,
                "mode": r.mode,
                "probability": r.probability,
                "weekday": r.weekday,
                "hour": r.hour,
                "crumb_care": r.crumb_care,
                "grease_care": r.grease_care,
                "water_care": r.water_care,
                "timestamp": row.timestamp,
            })
        })
        .collect();
    serde_json::Value::Array(items)
}
