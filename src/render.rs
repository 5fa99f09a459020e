//! # 结果渲染
//!
//! ## 设计思路
//!
//! 把预测结果或失败投影成与界面工具包无关的结构化内容：
//! - 成功：永远显示标签；有菜谱时显示标题、描述、有序食材、有序步骤，
//!   否则显示"未找到菜谱"的回退文本
//! - 失败：只显示失败消息，不携带任何菜谱内容
//!
//! `RenderedOutcome` 是二选一的枚举，结果与错误在类型层面就不可能混合。

use std::fmt;

use serde::Serialize;

use crate::failure::{FailureKind, FailureOutcome};
use crate::prediction::{PredictionResult, RecipeStructure};

/// 渲染后的结果面板或错误面板。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum RenderedOutcome {
    Result(ResultPanel),
    Error(ErrorPanel),
}

/// 结果面板。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPanel {
    pub label: String,
    pub recipe: RecipeContent,
}

/// 菜谱区域内容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum RecipeContent {
    Recipe(RecipeView),
    NotFound(String),
}

/// 菜谱展示内容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub heading: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// 错误面板。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPanel {
    #[serde(serialize_with = "serialize_kind")]
    pub kind: FailureKind,
    pub message: String,
}

fn serialize_kind<S: serde::Serializer>(kind: &FailureKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(kind)
}

impl RenderedOutcome {
    pub fn from_result(result: &PredictionResult) -> Self {
        Self::Result(render_result(result))
    }

    pub fn from_failure(failure: &FailureOutcome) -> Self {
        Self::Error(render_failure(failure))
    }

    pub fn is_result(&self) -> bool {
        matches!(self, Self::Result(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// 渲染成功结果。
pub fn render_result(result: &PredictionResult) -> ResultPanel {
    let recipe = match &result.recipe {
        Some(recipe) => RecipeContent::Recipe(render_recipe(recipe)),
        None => RecipeContent::NotFound(format!("Sorry, recipe not found for {}.", result.label)),
    };

    ResultPanel {
        label: result.label.clone(),
        recipe,
    }
}

fn render_recipe(recipe: &RecipeStructure) -> RecipeView {
    RecipeView {
        heading: format!("Recipe for {}", recipe.name),
        description: recipe.description.clone(),
        ingredients: recipe.ingredients.iter().map(|ing| ing.display_line()).collect(),
        instructions: recipe.instructions.clone(),
    }
}

/// 渲染失败：只保留消息。
pub fn render_failure(failure: &FailureOutcome) -> ErrorPanel {
    ErrorPanel {
        kind: failure.kind(),
        message: failure.message().to_string(),
    }
}

impl fmt::Display for RenderedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Result(panel) => panel.fmt(f),
            Self::Error(panel) => panel.fmt(f),
        }
    }
}

impl fmt::Display for ResultPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prediction: {}", self.label)?;
        match &self.recipe {
            RecipeContent::NotFound(text) => writeln!(f, "{text}"),
            RecipeContent::Recipe(view) => {
                writeln!(f, "{}", view.heading)?;
                if !view.description.is_empty() {
                    writeln!(f, "{}", view.description)?;
                }
                writeln!(f, "Ingredients:")?;
                for line in &view.ingredients {
                    writeln!(f, "  - {line}")?;
                }
                writeln!(f, "Instructions:")?;
                for (index, step) in view.instructions.iter().enumerate() {
                    writeln!(f, "  {}. {step}", index + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ErrorPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)
    }
}
