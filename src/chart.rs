//! Tag-frequency chart generation over the full bookmark set.

use serde_json::Value;
use std::collections::HashMap;

use crate::raindrop::ApiRaindrop;

/// How many tags make it into the chart
const TOP_TAGS: usize = 20;

/// Count how many bookmarks carry each tag. Tags are trimmed; blank ones skipped.
pub fn tag_frequency(items: &[Value]) -> HashMap<String, usize> {
  let mut frequency = HashMap::new();

  for raindrop in items.iter().filter_map(ApiRaindrop::from_item) {
    for tag in raindrop.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
      *frequency.entry(tag.to_string()).or_insert(0) += 1;
    }
  }

  frequency
}

/// Most frequent tags first; ties broken alphabetically.
fn top_tags(frequency: &HashMap<String, usize>) -> Vec<(&str, usize)> {
  let mut sorted: Vec<(&str, usize)> = frequency
    .iter()
    .map(|(tag, count)| (tag.as_str(), *count))
    .collect();
  sorted.sort_by(|(a_tag, a), (b_tag, b)| b.cmp(a).then_with(|| a_tag.cmp(b_tag)));
  sorted.truncate(TOP_TAGS);
  sorted
}

/// Render a fenced `chart` block (Obsidian Charts format) for the top tags.
pub fn chart_block(frequency: &HashMap<String, usize>) -> String {
  let top = top_tags(frequency);
  if top.is_empty() {
    return "```chart\n# No tags found\n```".to_string();
  }

  let labels: Vec<&str> = top.iter().map(|(tag, _)| *tag).collect();
  let data: Vec<usize> = top.iter().map(|(_, count)| *count).collect();

  format!(
    "```chart
type: bar
labels: {}
series:
  - title: Bookmarks per Tag
    data: {}
indexAxis: y
beginAtZero: true
labelColors: true
stacked: true
tension: 0.2
width: 80%
labelPosition: top
fill: false
```",
    Value::from(labels),
    Value::from(data),
  )
}
