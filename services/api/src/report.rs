use clap::Args;
use credit_risk::analytics::{AnalyticsCaches, AnalyticsService, PopulationTable, Threshold};
use credit_risk::error::AppError;
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Population CSV with score, defaulted and exposure columns
    #[arg(long)]
    pub(crate) population: PathBuf,
    /// Approval threshold on the normalized score
    #[arg(long, default_value_t = Threshold::DEFAULT)]
    pub(crate) threshold: f64,
    /// Optimization objective: profit, risk or balanced
    #[arg(long, default_value = "profit")]
    pub(crate) objective: String,
}

pub(crate) fn run_analysis(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        population,
        threshold,
        objective,
    } = args;

    let threshold = Threshold::new(threshold)?;
    let table = PopulationTable::from_path(&population)?;
    let service = AnalyticsService::new(Arc::new(table), AnalyticsCaches::default());

    print!("{}", render_analysis(&service, threshold, &objective));
    Ok(())
}

pub(crate) fn render_analysis(
    service: &AnalyticsService,
    threshold: Threshold,
    objective: &str,
) -> String {
    let metrics = service.get_metrics(threshold);
    let confusion = service.get_confusion_matrix(threshold);
    let roc = service.get_roc_curve();
    let optimized = service.optimize_threshold(objective);

    let mut out = String::new();
    // writes into a String cannot fail
    let _ = writeln!(
        out,
        "Population: {} customers | avg exposure {:.2}",
        metrics.total_customers, metrics.average_exposure
    );
    let _ = writeln!(out, "\nThreshold {:.2}", metrics.threshold);
    let _ = writeln!(
        out,
        "- approved {} ({:.1}%) | rejected {}",
        metrics.approved_count, metrics.approval_rate, metrics.rejected_count
    );
    let _ = writeln!(
        out,
        "- default rate among approved {:.1}%",
        metrics.default_rate_among_approved
    );
    let _ = writeln!(
        out,
        "- revenue {:.2} | losses {:.2} | net {:.2}",
        metrics.total_revenue, metrics.default_losses, metrics.net_balance
    );
    let _ = writeln!(
        out,
        "- avoided losses {:.2} | missed opportunity {:.2}",
        metrics.avoided_losses, metrics.missed_opportunity
    );

    let cells = confusion.cells;
    let _ = writeln!(out, "\nConfusion matrix (positive = rejected)");
    let _ = writeln!(
        out,
        "- tp {} | fp {} | tn {} | fn {}",
        cells.true_positives, cells.false_positives, cells.true_negatives, cells.false_negatives
    );
    let _ = writeln!(
        out,
        "- accuracy {:.2}% | precision {:.2}% | recall {:.2}% | f1 {:.2}%",
        confusion.accuracy, confusion.precision, confusion.recall, confusion.f1_score
    );

    let _ = writeln!(out, "\nROC AUC {:.4}", roc.auc);

    let _ = writeln!(
        out,
        "\nOptimal threshold ({}): {:.2} with value {:.2}",
        optimized.objective.name(),
        optimized.optimal_threshold,
        optimized.best_value
    );
    for point in &optimized.all_results {
        let marker = if point.threshold == optimized.optimal_threshold {
            "*"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "  {marker} {:.2}: value {:.2} | approval {:.1}% | default {:.1}%",
            point.threshold,
            point.value,
            point.metrics.approval_rate,
            point.metrics.default_rate_among_approved
        );
    }

    out
}
