use chrono::Local;
use sales_forecast::config::{ForecastConfig, ModelKind};
use sales_forecast::data::{generate_synthetic_data, SYNTHETIC_DAYS, SYNTHETIC_SEED};
use sales_forecast::pipeline::ForecastPipeline;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A year of generated bookings ending today
    let records = generate_synthetic_data(Local::now().date_naive(), SYNTHETIC_DAYS, SYNTHETIC_SEED);
    println!("Generated {} daily transactions", records.len());

    for model in [ModelKind::Classical, ModelKind::Regression, ModelKind::Ensemble] {
        let config = ForecastConfig {
            model,
            horizon: 7,
            ..ForecastConfig::default()
        };
        let points = ForecastPipeline::new(config).run_on_records(&records)?;

        println!("\nNext 7 days using the {} model:", model);
        for point in &points {
            println!(
                "{}: sales {:>10.2} [{:>10.2}, {:>10.2}]  bookings {}",
                point.date,
                point.predicted_sales,
                point.confidence_lower,
                point.confidence_upper,
                point.predicted_bookings
            );
        }
    }

    Ok(())
}
