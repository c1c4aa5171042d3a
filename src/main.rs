use anyhow::Result;
use solarmap::{pipeline, query, Building, BuildingCollection, Crs, PipelineConfig, Polygon, RoofType};
use tracing_subscriber::EnvFilter;

fn demo_district() -> Result<BuildingCollection> {
    let mut col = BuildingCollection::new(Crs::projected(28992));

    // A block in the city center: a tower overshadowing a low warehouse.
    col.add(
        Building::new("warehouse", Polygon::rectangle(0., 0., 40., 25.)?, 6.0)?
            .with_neighborhood("Centrum"),
    );
    col.add(
        Building::new("tower", Polygon::rectangle(45., 0., 18., 18.)?, 48.0)?
            .with_neighborhood("Centrum"),
    );
    col.add(
        Building::new("office", Polygon::rectangle(70., 5., 25., 15.)?, 21.0)?
            .with_neighborhood("Centrum"),
    );

    // Detached houses to the north, nothing tall nearby.
    col.add(
        Building::new("house-a", Polygon::rectangle(0., 400., 12., 8.)?, 7.5)?
            .with_roof_type(RoofType::Gabled)
            .with_neighborhood("Noord"),
    );
    col.add(
        Building::new("house-b", Polygon::rectangle(20., 402., 11., 9.)?, 8.0)?
            .with_roof_type(RoofType::Pitched)
            .with_neighborhood("Noord")
            .with_irradiance(1075.0),
    );
    col.add(
        Building::new("garage", Polygon::rectangle(35., 401., 6., 5.)?, 2.5)?
            .with_neighborhood("Noord"),
    );

    Ok(col)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let district = demo_district()?;
    let ranked = pipeline::run(district, &PipelineConfig::default())?;

    println!("rank  id          score  category    energy [kWh/yr]  payback [yr]");
    for b in &ranked {
        println!(
            "{:>4}  {:<10}  {:>5.1}  {:<10}  {:>15.0}  {:>12.1}",
            b.rank.unwrap_or(0),
            b.id,
            b.score.unwrap_or(0.0),
            b.category.map(|c| c.to_string()).unwrap_or_default(),
            b.energy_kwh.unwrap_or(0.0),
            b.payback_years.unwrap_or(f64::INFINITY),
        );
    }

    println!("\ntop picks:");
    for b in query::priority(&ranked, 3) {
        match query::suitability_breakdown(b) {
            Some(s) => println!("  {}", serde_json::to_string(&s)?),
            None => println!("  {} (not fully analyzed)", b.id),
        }
    }

    println!("\nneighborhoods:");
    let summaries = query::aggregate_by_neighborhood(&ranked);
    println!("{}", serde_json::to_string_pretty(&summaries)?);

    Ok(())
}
