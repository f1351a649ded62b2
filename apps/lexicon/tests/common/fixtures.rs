//! Test data builders.

use serde_json::{json, Value};

pub const WORDS_CSV: &str = "\u{feff}Word,Type,Definition,Level,Vietnamese,Synonym,Date Added\n\
    resilient,adj,able to recover quickly,C1,kiên cường,\"tough, hardy\",3/14/2024\n\
    resilient,noun,,C1,,,\n\
    meander,verb,to follow a winding course,B2,,wander,2024-03-15\n\
    \n\
    abate,v,to become less intense,C2,,,\n";

/// A chat-completions success body carrying `content`.
pub fn completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// A generation reply with one group for the CSV words.
pub fn word_groups() -> Value {
    json!({"word_groups": [{
        "group_id": "group_1",
        "group_name": "Endurance and movement",
        "words": ["resilient", "meander", "abate"],
        "exercises": [
            {"id": "ex_1", "type": "fill_blank", "instruction": "Complete the sentence",
             "sentence": "The river ___s through the valley.", "answer": "meander",
             "hint": "verb", "difficulty": "B2"},
            {"id": "ex_2", "type": "multiple_choice", "instruction": "Pick the best word",
             "sentence": "The storm began to ___.", "answer": "abate",
             "options": ["abate", "meander", "resilient", "linger"], "difficulty": "C2"},
            {"id": "ex_3", "type": "word_group_paragraph", "instruction": "Fill the paragraph",
             "sentence": "Despite setbacks she stayed ___.", "answer": "resilient"}
        ]
    }]})
}
