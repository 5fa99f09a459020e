//! # 线上协议与响应分类
//!
//! ## 设计思路
//!
//! 请求：`multipart/form-data`，单个文件字段承载图片字节。
//! 响应分三类处理：
//! 1. 非成功状态码 → `ServerRejected`，消息优先取响应体 `error` 字段
//! 2. 成功但结构不合法（缺标签、菜谱形状错误）→ `MalformedResponse`
//! 3. 成功且合法 → `PredictionResult`
//!
//! ## 实现思路
//!
//! - 先按 `Value` 要求对象形状，再用 `serde` 派生的线上结构解析，最后做语义校验（空标签等）。
//! - 标签与错误消息原样保留，只在判空时忽略首尾空白。
//! - 食材数量/单位兼容字符串与数字两种写法，统一成字符串。
//! - 未知字段（如 `folderName`）直接忽略。

use bytes::Bytes;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::model::{Ingredient, PredictionResult, RecipeStructure};
use crate::failure::FailureOutcome;

/// 一次提交要上传的内容。
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub bytes: Bytes,
    pub media_type: String,
}

/// 服务端原始响应。
#[derive(Debug, Clone)]
pub struct ServiceReply {
    pub status: u16,
    /// 状态码对应的原因短语（如 `Internal Server Error`）。
    pub reason: Option<String>,
    pub body: Bytes,
}

impl ServiceReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Deserialize)]
struct WirePrediction {
    prediction: Option<String>,
    #[serde(default)]
    recipe: Option<WireRecipe>,
}

#[derive(Debug, Deserialize)]
struct WireRecipe {
    name: String,
    #[serde(default)]
    description: Option<String>,
    ingredients: Vec<WireIngredient>,
    instructions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireIngredient {
    name: String,
    #[serde(default, deserialize_with = "scalar_text")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: Option<String>,
}

/// 将字符串或数字统一成可选字符串，空白视为缺省。
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

/// 将服务端响应分类为预测结果或失败。
pub fn classify_reply(reply: &ServiceReply) -> Result<PredictionResult, FailureOutcome> {
    if !reply.is_success() {
        return Err(FailureOutcome::ServerRejected(rejection_message(reply)));
    }

    let body: Value = serde_json::from_slice(&reply.body).map_err(|e| {
        log::warn!("⚠️ 预测响应不是合法 JSON：{}", e);
        malformed(&format!("invalid JSON ({e})"))
    })?;
    require_object_shape(&body)?;

    let wire: WirePrediction = serde_json::from_value(body).map_err(|e| {
        log::warn!("⚠️ 预测响应结构无法解析：{}", e);
        malformed(&format!("invalid JSON structure ({e})"))
    })?;

    let label = wire
        .prediction
        .filter(|label| !label.trim().is_empty())
        .ok_or_else(|| malformed("missing prediction label"))?;

    let recipe = wire.recipe.map(|recipe| RecipeStructure {
        name: recipe.name,
        description: recipe.description.unwrap_or_default(),
        ingredients: recipe
            .ingredients
            .into_iter()
            .map(|ing| Ingredient {
                name: ing.name,
                quantity: ing.quantity,
                unit: ing.unit,
            })
            .collect(),
        instructions: recipe.instructions,
    });

    Ok(PredictionResult { label, recipe })
}

/// 响应体、菜谱与每个食材都必须是 JSON 对象。
///
/// 派生的 `Deserialize` 也会按字段顺序接受数组，这里先行拦截。
fn require_object_shape(body: &Value) -> Result<(), FailureOutcome> {
    let Value::Object(fields) = body else {
        return Err(malformed("expected a JSON object"));
    };

    let recipe = match fields.get("recipe") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Object(recipe)) => recipe,
        Some(_) => return Err(malformed("recipe must be a JSON object")),
    };

    if let Some(Value::Array(ingredients)) = recipe.get("ingredients")
        && ingredients.iter().any(|ing| !ing.is_object())
    {
        return Err(malformed("each ingredient must be a JSON object"));
    }

    Ok(())
}

/// 拒绝消息：优先取响应体 `error` 字段，否则回退到状态描述。
fn rejection_message(reply: &ServiceReply) -> String {
    serde_json::from_slice::<WireError>(&reply.body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| match reply.reason.as_deref() {
            Some(reason) if !reason.is_empty() => format!("Server error: {reason}"),
            _ => format!("Server error: HTTP {}", reply.status),
        })
}

fn malformed(detail: &str) -> FailureOutcome {
    FailureOutcome::MalformedResponse(format!(
        "Unexpected response from the prediction service: {detail}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureKind;

    fn reply(status: u16, reason: Option<&str>, body: &str) -> ServiceReply {
        ServiceReply {
            status,
            reason: reason.map(str::to_string),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn null_recipe_yields_label_without_recipe() {
        let result = classify_reply(&reply(200, Some("OK"), r#"{"prediction":"pizza","recipe":null}"#))
            .expect("should classify");

        assert_eq!(result.label, "pizza");
        assert!(result.recipe.is_none());
    }

    #[test]
    fn recipe_order_is_preserved() {
        let body = r#"{
            "prediction": "omelette",
            "recipe": {
                "folderName": "omelette",
                "name": "Omelette",
                "description": "Fluffy eggs",
                "ingredients": [{"name": "egg", "quantity": "2"}, {"name": "butter", "quantity": 1, "unit": "tbsp"}],
                "instructions": ["Beat eggs", "Cook"]
            }
        }"#;

        let recipe = classify_reply(&reply(200, None, body))
            .expect("should classify")
            .recipe
            .expect("recipe present");

        assert_eq!(recipe.instructions, vec!["Beat eggs", "Cook"]);
        assert_eq!(recipe.ingredients[0].name, "egg");
        assert_eq!(recipe.ingredients[1].quantity.as_deref(), Some("1"));
        assert_eq!(recipe.ingredients[1].unit.as_deref(), Some("tbsp"));
    }

    #[test]
    fn missing_label_is_malformed() {
        let failure = classify_reply(&reply(200, None, r#"{"recipe":null}"#)).unwrap_err();
        assert_eq!(failure.kind(), FailureKind::MalformedResponse);

        let failure = classify_reply(&reply(200, None, r#"{"prediction":"   "}"#)).unwrap_err();
        assert_eq!(failure.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn malformed_recipe_shape_is_malformed() {
        let body = r#"{"prediction":"dal","recipe":{"name":"Dal","ingredients":"lentils","instructions":[]}}"#;

        let failure = classify_reply(&reply(200, None, body)).unwrap_err();

        assert_eq!(failure.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn array_body_is_malformed() {
        let failure = classify_reply(&reply(200, None, r#"["pizza"]"#)).unwrap_err();

        assert_eq!(failure.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn array_shaped_recipe_is_malformed() {
        let body = r#"{"prediction":"dal","recipe":["Dal",null,[["lentils","1","cup"]],["Boil"]]}"#;

        let failure = classify_reply(&reply(200, None, body)).unwrap_err();

        assert_eq!(failure.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn array_shaped_ingredient_is_malformed() {
        let body = r#"{"prediction":"dal","recipe":{"name":"Dal","ingredients":[["lentils","1","cup"]],"instructions":["Boil"]}}"#;

        let failure = classify_reply(&reply(200, None, body)).unwrap_err();

        assert_eq!(failure.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn label_and_error_message_are_kept_verbatim() {
        let result = classify_reply(&reply(200, None, r#"{"prediction":" pad thai "}"#))
            .expect("should classify");
        assert_eq!(result.label, " pad thai ");

        let failure = classify_reply(&reply(400, Some("Bad Request"), r#"{"error":"  no file  "}"#))
            .unwrap_err();
        assert_eq!(failure.message(), "  no file  ");
    }

    #[test]
    fn non_json_success_body_is_malformed() {
        let failure = classify_reply(&reply(200, None, "<html>oops</html>")).unwrap_err();

        assert_eq!(failure.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn rejection_uses_error_field() {
        let failure = classify_reply(&reply(
            503,
            Some("Service Unavailable"),
            r#"{"error":"model unavailable"}"#,
        ))
        .unwrap_err();

        assert_eq!(failure, FailureOutcome::ServerRejected("model unavailable".to_string()));
    }

    #[test]
    fn rejection_without_error_field_falls_back_to_status() {
        let failure = classify_reply(&reply(500, Some("Internal Server Error"), "boom")).unwrap_err();
        assert_eq!(failure.message(), "Server error: Internal Server Error");

        let failure = classify_reply(&reply(599, None, r#"{"detail":"x"}"#)).unwrap_err();
        assert_eq!(failure.message(), "Server error: HTTP 599");
    }
}
