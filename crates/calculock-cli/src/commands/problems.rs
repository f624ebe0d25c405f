use calculock_core::problem::standard_problems;
use serde::Serialize;

#[derive(Serialize)]
struct ProblemView {
    question: String,
    hint: String,
}

/// Answers are never printed.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let problems: Vec<ProblemView> = standard_problems()
        .into_iter()
        .map(|p| ProblemView {
            question: p.question,
            hint: p.hint,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&problems)?);
    Ok(())
}
