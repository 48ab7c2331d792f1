use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde::Deserialize;
use tracing::debug;

use super::{JudgmentOracle, OracleError};
use crate::config::{ConfigError, OracleConfig};
use crate::workflows::screening::{Judgment, JudgmentValue, Question, QuestionRubric};

/// Explanation attached when a delivered reply cannot be parsed. Parse
/// recovery happens here, inside the oracle; it is distinct from the
/// evaluator's fallback for transport failures.
const PARSE_FALLBACK_EXPLANATION: &str = "Could not analyze properly. Please try again.";

/// Scoring oracle backed by any OpenAI-compatible chat-completions endpoint.
pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiOracle {
    pub fn from_config(config: &OracleConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(api_base) = config.api_base.as_deref() {
            openai_config = openai_config.with_api_base(api_base);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()
            .map_err(|source| OracleError::request(&self.model, source))?;
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(user)
            .build()
            .map_err(|source| OracleError::request(&self.model, source))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_message),
                ChatCompletionRequestMessage::User(user_message),
            ])
            .temperature(0.2)
            .max_tokens(1024u32)
            .build()
            .map_err(|source| OracleError::request(&self.model, source))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|source| OracleError::request(&self.model, source))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| OracleError::EmptyReply {
                model: self.model.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl JudgmentOracle for OpenAiOracle {
    async fn judge(
        &self,
        document: &str,
        question: &Question,
        guidance: &str,
    ) -> Result<Judgment, OracleError> {
        debug!(model = %self.model, question = %question.id, "dispatching oracle call");

        let (system, user) = build_prompts(question, document, guidance);
        let reply = self.complete(&system, &user).await?;

        Ok(parse_reply(&reply, question))
    }
}

fn build_prompts(question: &Question, document: &str, guidance: &str) -> (String, String) {
    let custom_instructions = if guidance.trim().is_empty() {
        String::new()
    } else {
        format!("\nCustom instructions: {}\n", guidance.trim())
    };

    let (task, reply_shape) = match question.rubric {
        QuestionRubric::Scale { .. } => (
            "Evaluate the CV based on the question and provide a score from 0 to 10, \
             where 0 means the candidate doesn't meet the criteria at all and 10 means \
             they exceed expectations. Also provide a brief explanation for your score.",
            r#"{"score": <number between 0 and 10>, "explanation": "<brief explanation>"}"#,
        ),
        QuestionRubric::Filter { .. } | QuestionRubric::YesNo { .. } => (
            "Evaluate the CV based on the question and provide a yes or no answer. \
             Also provide a brief explanation for your answer.",
            r#"{"answer": <true for yes, false for no>, "explanation": "<brief explanation>"}"#,
        ),
    };

    let system = format!(
        "You are an expert HR assistant that analyzes CVs. \
         You will be given a CV and a question about the candidate. {task}\n\
         {custom_instructions}\
         Your response must be raw JSON with the following structure:\n{reply_shape}\n\
         IMPORTANT: Do not include markdown formatting, code block markers, or any text \
         outside the JSON object."
    );

    let question_guidance = match question.guidance.as_deref() {
        Some(examples) => format!("\nExamples/Guidance: {examples}\n"),
        None => String::new(),
    };

    let user = format!(
        "CV:\n{document}\n\nQuestion: {question_text}\n{question_guidance}",
        question_text = question.text,
    );

    (system, user)
}

#[derive(Debug, Deserialize)]
struct ScoreReply {
    score: f64,
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnswerReply {
    answer: bool,
    explanation: Option<String>,
}

fn parse_reply(raw: &str, question: &Question) -> Judgment {
    let payload = extract_json(raw);

    match question.rubric {
        QuestionRubric::Scale { .. } => match serde_json::from_str::<ScoreReply>(payload) {
            Ok(reply) => Judgment {
                value: JudgmentValue::Score(reply.score),
                explanation: reply.explanation,
            },
            Err(_) => parse_fallback(question),
        },
        QuestionRubric::Filter { .. } | QuestionRubric::YesNo { .. } => {
            match serde_json::from_str::<AnswerReply>(payload) {
                Ok(reply) => Judgment {
                    value: JudgmentValue::Answer(reply.answer),
                    explanation: reply.explanation,
                },
                Err(_) => parse_fallback(question),
            }
        }
    }
}

fn parse_fallback(question: &Question) -> Judgment {
    let value = match question.rubric {
        QuestionRubric::Scale { .. } => JudgmentValue::Score(5.0),
        QuestionRubric::Filter { .. } | QuestionRubric::YesNo { .. } => {
            JudgmentValue::Answer(false)
        }
    };

    Judgment {
        value,
        explanation: Some(PARSE_FALLBACK_EXPLANATION.to_string()),
    }
}

/// Models sometimes wrap the JSON in a Markdown code fence despite the
/// instructions; pull the fenced payload out before parsing.
fn extract_json(raw: &str) -> &str {
    if let Some(start) = raw.find("```") {
        let fenced = &raw[start + 3..];
        let fenced = fenced.strip_prefix("json").unwrap_or(fenced);
        if let Some(end) = fenced.find("```") {
            return fenced[..end].trim();
        }
    }

    raw.trim()
}
