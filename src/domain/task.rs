use crate::domain::errors::TaskError;
use crate::domain::ml::{EvaluationResult, ForecastPath};
use crate::domain::trading::simulation::ProfitSimulation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One analysis request: an instrument and a hypothetical investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTask {
    #[serde(default = "Uuid::new_v4")]
    pub task_id: Uuid,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub chat_id: Option<i64>,
    /// Chat message to clean up once the result is delivered
    #[serde(default)]
    pub wait_message_id: Option<i64>,
    pub ticker: String,
    pub amount: Decimal,
}

impl AnalysisTask {
    pub fn new(ticker: impl Into<String>, amount: Decimal) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            user_id: None,
            chat_id: None,
            wait_message_id: None,
            ticker: ticker.into(),
            amount,
        }
    }

    /// Field checks that must pass before any data is loaded.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.ticker.trim().is_empty() {
            return Err(TaskError::EmptyTicker);
        }
        if self.amount <= Decimal::ZERO {
            return Err(TaskError::InvalidAmount {
                amount: self.amount.to_string(),
            });
        }
        Ok(())
    }
}

/// Result record handed back to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisResult {
    Success(Box<AnalysisReport>),
    Error(AnalysisFailure),
}

impl AnalysisResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success(_))
    }

    pub fn task_id(&self) -> Option<Uuid> {
        match self {
            AnalysisResult::Success(report) => Some(report.task_id),
            AnalysisResult::Error(failure) => failure.task_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub task_id: Uuid,
    pub user_id: Option<i64>,
    pub chat_id: Option<i64>,
    pub wait_message_id: Option<i64>,
    pub ticker: String,
    pub amount: Decimal,
    pub current_price: f64,
    pub predicted_price: f64,
    pub price_change_percent: f64,
    pub recommendation: String,
    pub transactions: Vec<String>,
    pub simulation: ProfitSimulation,
    pub calculated_profit: Decimal,
    pub best_model: String,
    /// Hold-out RMSE of the selected model; absent for the persistence fallback.
    pub rmse: Option<f64>,
    pub evaluations: Vec<EvaluationResult>,
    pub forecast: ForecastPath,
    /// Rendered history + forecast chart. Rendering happens outside this crate.
    pub chart: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
    pub task_id: Option<Uuid>,
    pub user_id: Option<i64>,
    pub chat_id: Option<i64>,
    pub wait_message_id: Option<i64>,
    pub ticker: Option<String>,
}

impl AnalysisFailure {
    pub fn for_task(task: &AnalysisTask, error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            task_id: Some(task.task_id),
            user_id: task.user_id,
            chat_id: task.chat_id,
            wait_message_id: task.wait_message_id,
            ticker: Some(task.ticker.clone()),
        }
    }

    /// Failure for input that could not even be decoded into a task.
    pub fn unparsed(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            task_id: None,
            user_id: None,
            chat_id: None,
            wait_message_id: None,
            ticker: None,
        }
    }
}
