//! Structural repair of model-produced JSON.
//!
//! [`normalize`] is text in, text out. It fixes shape drift the formatter
//! is known to produce and rewrites keys to lower camel case. It never
//! fails: anything that does not parse is returned unchanged.

use serde_json::map::Entry;
use serde_json::{Map, Number, Value};

/// Names of the meal slots, in positional order.
const MEAL_SLOTS: [&str; 3] = ["breakfast", "lunch", "dinner"];

/// Returns the JSON payload inside `content`.
///
/// Strips a surrounding markdown code fence and, when the text still does
/// not start with `{` or `[`, narrows it to the outermost `{ ... }` span.
#[must_use]
pub fn json_payload(content: &str) -> &str {
    let trimmed = content.trim();
    let unfenced = if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```JSON")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    };

    if unfenced.starts_with('{') || unfenced.starts_with('[') {
        return unfenced;
    }
    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}

/// Converts a `lower_snake_case` key to `lowerCamelCase`.
///
/// Keys without underscores keep their casing apart from the first letter,
/// so `tripOverview` and `TripOverview` both become `tripOverview`.
#[must_use]
pub fn snake_to_camel(key: &str) -> String {
    let mut joined = String::with_capacity(key.len());
    for (i, segment) in key.split('_').filter(|s| !s.is_empty()).enumerate() {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                joined.push(first);
            } else {
                joined.extend(first.to_uppercase());
            }
            joined.push_str(chars.as_str());
        }
    }

    let mut chars = joined.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

fn meal_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(obj)) => obj
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| Value::Object(obj.clone()).to_string(), ToString::to_string),
        Some(other) => other.to_string(),
    }
}

/// Destructures a meals array positionally into breakfast, lunch, dinner.
fn meals_from_array(items: &[Value]) -> Value {
    let mut meals = Map::new();
    for (i, slot) in MEAL_SLOTS.iter().enumerate() {
        meals.insert((*slot).to_string(), Value::String(meal_text(items.get(i))));
    }
    Value::Object(meals)
}

/// Integral floats become integers; everything else is kept.
fn narrow_number(n: Number) -> Number {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() < 9.0e15
    {
        #[allow(clippy::cast_possible_truncation)]
        return Number::from(f as i64);
    }
    n
}

fn normalize_value(value: Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut out = Map::with_capacity(obj.len());
            for (key, child) in obj {
                let child = match child {
                    Value::Array(items) if key == "meals" => meals_from_array(&items),
                    other => normalize_value(other),
                };
                let camel = snake_to_camel(&key);
                let was_camel = camel == key;
                // A key the model already wrote in camel case wins over a
                // converted duplicate, whichever order they arrive in.
                match out.entry(camel) {
                    Entry::Vacant(slot) => {
                        slot.insert(child);
                    }
                    Entry::Occupied(mut slot) if was_camel => {
                        slot.insert(child);
                    }
                    Entry::Occupied(_) => {}
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        Value::Number(n) => Value::Number(narrow_number(n)),
        other => other,
    }
}

/// Normalizes an already-parsed JSON tree.
#[must_use]
pub fn normalize_tree(value: Value) -> Value {
    normalize_value(value)
}

/// Repairs known shape mismatches and camel-cases every key.
///
/// Returns `text` unchanged when it does not contain parseable JSON.
#[must_use]
pub fn normalize(text: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(json_payload(text)) else {
        return text.to_string();
    };
    serde_json::to_string(&normalize_value(value)).unwrap_or_else(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use test_case::test_case;

    fn normalized(value: &Value) -> Value {
        serde_json::from_str(&normalize(&value.to_string())).unwrap_or(Value::Null)
    }

    #[test_case("trip_overview", "tripOverview" ; "two segments")]
    #[test_case("price_per_night", "pricePerNight" ; "three segments")]
    #[test_case("tripOverview", "tripOverview" ; "already camel")]
    #[test_case("TravelTips", "travelTips" ; "pascal")]
    #[test_case("_id", "id" ; "leading underscore")]
    #[test_case("day", "day" ; "single word")]
    #[test_case("", "" ; "empty")]
    fn test_snake_to_camel(input: &str, expected: &str) {
        assert_eq!(snake_to_camel(input), expected);
    }

    #[test]
    fn test_meals_array_becomes_object() {
        let out = normalized(&json!({"meals": ["A", "B", "C"]}));
        assert_eq!(out, json!({"meals": {"breakfast": "A", "lunch": "B", "dinner": "C"}}));
    }

    #[test]
    fn test_short_meals_array_defaults_to_empty() {
        let out = normalized(&json!({"meals": ["Hotel buffet", null]}));
        assert_eq!(
            out,
            json!({"meals": {"breakfast": "Hotel buffet", "lunch": "", "dinner": ""}})
        );
        let out = normalized(&json!({"meals": [{"name": "Koshary"}]}));
        assert_eq!(out["meals"]["breakfast"], "Koshary");
    }

    #[test]
    fn test_meals_object_passes_through() {
        let meals = json!({"meals": {"breakfast": "A", "lunch": "B", "dinner": "C"}});
        assert_eq!(normalized(&meals), meals);
    }

    #[test]
    fn test_nested_keys_and_numbers() {
        let out = normalized(&json!({
            "trip_overview": {"duration_days": 3.0},
            "estimated_costs": {"per_day": 101.5, "total": 304.0},
            "itinerary": [{"day": 1, "activities": [{"duration_hours": 2.0, "activity_type": "history"}]}]
        }));
        assert_eq!(out["tripOverview"]["durationDays"], json!(3));
        assert!(out["tripOverview"]["durationDays"].is_i64());
        assert_eq!(out["estimatedCosts"]["perDay"], json!(101.5));
        assert_eq!(out["itinerary"][0]["activities"][0]["activityType"], "history");
        assert!(out["itinerary"][0]["activities"][0]["durationHours"].is_i64());
    }

    #[test]
    fn test_camel_key_wins_over_snake_duplicate() {
        let camel_last = normalize(
            r#"{"trip_overview": {"destination": "Cairo"}, "tripOverview": {"destination": "Luxor"}}"#,
        );
        let camel_first = normalize(
            r#"{"tripOverview": {"destination": "Luxor"}, "trip_overview": {"destination": "Cairo"}}"#,
        );
        let expected = json!({"tripOverview": {"destination": "Luxor"}});
        for text in [camel_last, camel_first] {
            let value: Value = serde_json::from_str(&text).unwrap_or_default();
            assert_eq!(value, expected);
        }
    }

    #[test]
    fn test_unparseable_text_returned_unchanged() {
        let text = "Sorry, I could not build the itinerary {broken";
        assert_eq!(normalize(text), text);
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_code_fence_and_chatter_stripped() {
        let fenced = "```json\n{\"travel_tips\": [\"Carry water\"]}\n```";
        assert_eq!(normalize(fenced), r#"{"travelTips":["Carry water"]}"#);
        let chatty = "Here is your plan: {\"day\": 1} Enjoy!";
        assert_eq!(normalize(chatty), r#"{"day":1}"#);
    }

    proptest! {
        #[test]
        fn prop_snake_keys_lose_underscores(segments in proptest::collection::vec("[a-z]{1,8}", 1..5)) {
            let key = segments.join("_");
            let camel = snake_to_camel(&key);
            prop_assert!(!camel.contains('_'));
            prop_assert_eq!(camel.to_lowercase(), segments.concat());
            prop_assert!(camel.chars().next().is_some_and(char::is_lowercase));
        }

        #[test]
        fn prop_normalize_is_idempotent(
            keys in proptest::collection::vec("[a-z]{1,6}(_[a-z]{1,6}){0,2}", 1..6),
            meals in proptest::collection::vec("[A-Za-z ]{0,12}", 0..5),
            amount in 0u32..100_000,
        ) {
            let mut obj = Map::new();
            for (i, k) in keys.iter().enumerate() {
                obj.insert(k.clone(), json!(f64::from(amount) + f64::from(u32::try_from(i).unwrap_or(0))));
            }
            obj.insert("meals".to_string(), json!(meals));
            let once = normalize(&Value::Object(obj).to_string());
            let twice = normalize(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
