use std::collections::HashMap;
use std::sync::Arc;

use cstats_core::{
    CharacterRecord, ConversationContext, DescriptionTable, OverrideForm, PipelineConfig,
    StatsEngine, StatsError, TurnInput, process_turn, stats_block,
};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::Runtime;

const DEFAULT_CONVERSATION: &str = "default";

#[derive(Clone)]
pub struct CsServer {
    state: Arc<Mutex<ServerState>>,
    tool_router: ToolRouter<Self>,
}

struct ServerState {
    engine: StatsEngine,
    table: DescriptionTable,
    pipeline: PipelineConfig,
    /// Per-conversation turn counters and description baselines.
    conversations: HashMap<String, ConversationContext>,
}

impl CsServer {
    pub fn new(runtime: Runtime) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState {
                engine: runtime.engine,
                table: runtime.table,
                pipeline: runtime.pipeline,
                conversations: HashMap::new(),
            })),
            tool_router: Self::tool_router(),
        }
    }
}

/// Derived stats as reported by `cs_stats` and `cstats stats --json`.
pub fn stats_json(record: &CharacterRecord) -> serde_json::Value {
    let bmi = record.bmi();
    let sizing = record.sizing();
    let (feet, inches) = record.height_feet_inches();
    serde_json::json!({
        "name": record.name(),
        "age": record.age(),
        "date": record.date().to_string(),
        "start_date": record.start_date().to_string(),
        "birthday": record.birthday().to_string(),
        "height": record.height(),
        "height_feet": feet,
        "height_inches": inches,
        "start_weight": record.start_weight(),
        "weight": record.weight(),
        "weight_diff": record.weight_diff(),
        "bmi": bmi.value,
        "bmi_category": bmi.category.label(),
        "calories": record.calories(),
        "max_calories": record.max_calories(),
        "fullness": record.fullness().label(),
        "shirt_size": sizing.shirt_size(),
        "shirt_fit": sizing.shirt_fit.label(),
        "pant_size": sizing.pant_size,
        "pant_fit": sizing.pant_fit.label(),
        "inject_stats": record.inject_stats(),
    })
}

fn stats_error(e: StatsError) -> McpError {
    match e {
        StatsError::InvalidInput { .. } => McpError::invalid_params(e.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn json_result(value: &serde_json::Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("failed to serialize result: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

// --- Tool parameter types ---

#[derive(Debug, Deserialize, JsonSchema)]
struct TurnRequest {
    /// Message text, including any ==END_DAY==, ==RESET== or {food:calories} tokens
    text: String,
    /// Copy of the message shown in the user's transcript; defaults to `text`
    visible_text: Option<String>,
    /// Conversation the turn belongs to; turns without one share a default conversation
    conversation_id: Option<String>,
}

/// Every field is a string as entered in a form. Omitted fields keep the
/// character's current value.
#[derive(Debug, Default, Deserialize, JsonSchema)]
struct OverrideRequest {
    name: Option<String>,
    start_weight: Option<String>,
    weight: Option<String>,
    /// Height in inches
    height: Option<String>,
    calories: Option<String>,
    current_year: Option<String>,
    current_month: Option<String>,
    current_day: Option<String>,
    start_year: Option<String>,
    start_month: Option<String>,
    start_day: Option<String>,
    birth_year: Option<String>,
    birth_month: Option<String>,
    birth_day: Option<String>,
}

impl OverrideRequest {
    fn merge_into(self, form: &mut OverrideForm) {
        let pairs = [
            (self.name, &mut form.name),
            (self.start_weight, &mut form.start_weight),
            (self.weight, &mut form.weight),
            (self.height, &mut form.height),
            (self.calories, &mut form.calories),
            (self.current_year, &mut form.current_year),
            (self.current_month, &mut form.current_month),
            (self.current_day, &mut form.current_day),
            (self.start_year, &mut form.start_year),
            (self.start_month, &mut form.start_month),
            (self.start_day, &mut form.start_day),
            (self.birth_year, &mut form.birth_year),
            (self.birth_month, &mut form.birth_month),
            (self.birth_day, &mut form.birth_day),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct InjectRequest {
    /// Attach the stats block to every turn, not just eventful ones
    enabled: bool,
}

#[tool_router]
impl CsServer {
    #[tool(
        description = "Process one conversation turn. Applies ==END_DAY==, ==RESET== and {food:calories} tokens to the character, then returns the text to send to the model (with the stats block when the turn was eventful), the visible transcript copy, and a report of what changed."
    )]
    async fn cs_turn(
        &self,
        Parameters(req): Parameters<TurnRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let id = req
            .conversation_id
            .unwrap_or_else(|| DEFAULT_CONVERSATION.to_string());
        let context = state.conversations.entry(id.clone()).or_default();
        let input = TurnInput {
            text: &req.text,
            visible_text: req.visible_text.as_deref().unwrap_or(&req.text),
        };
        let output = process_turn(
            &mut state.engine,
            &state.table,
            context,
            &state.pipeline,
            input,
        );
        tracing::info!(
            conversation = %id,
            turn = context.turns,
            injected = output.report.injected,
            "cs_turn"
        );

        let result = serde_json::json!({
            "conversation_id": id,
            "text": output.text,
            "visible_text": output.visible_text,
            "report": output.report,
        });
        json_result(&result)
    }

    #[tool(
        description = "Get the character's current derived stats (BMI, fullness, clothing sizes, date) and the rendered stats block."
    )]
    async fn cs_stats(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let record = state.engine.record();
        let mut stats = stats_json(record);
        stats["stats_block"] = serde_json::json!(stats_block(record));
        stats["description_rows"] = serde_json::json!(state.table.len());
        stats["conversations"] = serde_json::json!(state.conversations.len());
        json_result(&stats)
    }

    #[tool(
        description = "Override the character's settings from form strings. Numbers may be written as \"170\" or \"170.0\". All fields are validated before anything changes; an invalid field leaves the character untouched."
    )]
    async fn cs_override(
        &self,
        Parameters(req): Parameters<OverrideRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let record = state.engine.record_mut();

        let mut form = OverrideForm::from_record(record);
        req.merge_into(&mut form);
        form.apply(record).map_err(stats_error)?;
        tracing::info!("cs_override applied for '{}'", record.name());

        json_result(&stats_json(record))
    }

    #[tool(
        description = "Turn stats injection on or off. When on, every turn carries the stats block."
    )]
    async fn cs_inject(
        &self,
        Parameters(req): Parameters<InjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        state.engine.record_mut().set_inject_stats(req.enabled);
        tracing::info!(enabled = req.enabled, "cs_inject");
        json_result(&serde_json::json!({
            "inject_stats": req.enabled,
        }))
    }

    #[tool(
        description = "Reset the character to its starting settings, the same as an ==RESET== token."
    )]
    async fn cs_reset(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        state.engine.reset();
        for context in state.conversations.values_mut() {
            context.last_reported_bmi = None;
        }
        tracing::info!("cs_reset");
        json_result(&stats_json(state.engine.record()))
    }
}

#[tool_handler]
impl ServerHandler for CsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Tracks a roleplay character's body stats across a conversation.\n\n\
                 USAGE:\n\
                 1. Pass every user message through cs_turn before sending it to the model, \
                    and send the returned `text` in place of the message. Show `visible_text` \
                    in the transcript.\n\
                 2. Tokens in a message drive the simulation: ==END_DAY== ends the day and \
                    converts surplus calories to weight, {food:calories} records a meal, \
                    ==RESET== restores the starting character.\n\
                 3. Use one conversation_id per chat so descriptions are tracked separately.\n\
                 4. cs_stats reports the current state; cs_override and cs_inject change settings."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
