use clap::ValueEnum;
use dsr::Metric;
use dsr::compare::Statistic;

/// Metric selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Canberra,
    Chebyshev,
    Euclidean,
    Manhattan,
    Pearson,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Canberra => Metric::Canberra,
            MetricArg::Chebyshev => Metric::Chebyshev,
            MetricArg::Euclidean => Metric::Euclidean,
            MetricArg::Manhattan => Metric::Manhattan,
            MetricArg::Pearson => Metric::Pearson,
        }
    }
}

/// Statistic tabulated by `dsr compare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatisticArg {
    Accuracy,
    Coverage,
}

impl From<StatisticArg> for Statistic {
    fn from(arg: StatisticArg) -> Self {
        match arg {
            StatisticArg::Accuracy => Statistic::Accuracy,
            StatisticArg::Coverage => Statistic::Coverage,
        }
    }
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
