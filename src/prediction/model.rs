//! 预测结果领域模型。
//!
//! 食材与步骤的顺序与展示相关，必须按服务端返回的顺序原样保留。

use serde::Serialize;

/// 成功且结构合法的预测结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    pub label: String,
    pub recipe: Option<RecipeStructure>,
}

/// 菜谱。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeStructure {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
}

/// 单个食材；数量与单位可缺省。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

impl Ingredient {
    /// 按"数量 单位 名称"拼接展示文本，缺省部分直接跳过。
    pub fn display_line(&self) -> String {
        [self.quantity.as_deref(), self.unit.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, quantity: Option<&str>, unit: Option<&str>) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            quantity: quantity.map(str::to_string),
            unit: unit.map(str::to_string),
        }
    }

    #[test]
    fn display_line_joins_present_parts() {
        assert_eq!(ingredient("flour", Some("200"), Some("g")).display_line(), "200 g flour");
        assert_eq!(ingredient("egg", Some("2"), None).display_line(), "2 egg");
        assert_eq!(ingredient("salt", None, Some("pinch")).display_line(), "pinch salt");
        assert_eq!(ingredient("water", None, None).display_line(), "water");
    }
}
