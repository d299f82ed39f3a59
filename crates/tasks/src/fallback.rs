//! Static, domain-keyed task catalog.
//!
//! Used whenever generation or parsing fails, and to pad partially
//! extracted task lists up to three entries.

use ts_domain::task::{Task, TaskDomain, CANONICAL_TASK_COUNT};

type Entry = (&'static str, &'static str, &'static str);

const WEBSITE: [Entry; CANONICAL_TASK_COUNT] = [
    (
        "Optimize page titles and meta descriptions",
        "Review the title tag and meta description of your key pages. Keep titles between 10 and 60 characters, lead with the main keyword and write a unique description for each page.",
        "2 hours",
    ),
    (
        "Improve mobile layout and load speed",
        "Test the site on a phone-sized viewport, compress oversized images and remove render-blocking scripts so the main content appears within a few seconds.",
        "3 hours",
    ),
    (
        "Add a clear call to action on the homepage",
        "Decide on the one action visitors should take, then place a prominent button or form above the fold and link to it from the navigation.",
        "1 hour",
    ),
];

const BUSINESS: [Entry; CANONICAL_TASK_COUNT] = [
    (
        "Create a one-page business plan",
        "Write down the problem you solve, who your customers are, how you reach them and how the business makes money. Keep it to a single page so it is easy to revisit.",
        "2 hours",
    ),
    (
        "Build a simple revenue and cost forecast",
        "Set up a spreadsheet with expected monthly revenue, fixed costs and variable costs for the next twelve months to see when the business breaks even.",
        "3 hours",
    ),
    (
        "Implement a weekly customer outreach routine",
        "Block a recurring slot each week to contact existing and potential customers, note their feedback and track which channels bring the best responses.",
        "1 hour",
    ),
];

const EDUCATION: [Entry; CANONICAL_TASK_COUNT] = [
    (
        "Create a structured study schedule",
        "Break the material into weekly topics, assign each study session a clear goal and leave buffer days before any exams or deadlines.",
        "1 hour",
    ),
    (
        "Build a set of active recall flashcards",
        "Turn the key concepts of the current topic into question-and-answer cards and review them using spaced repetition instead of rereading notes.",
        "2 hours",
    ),
    (
        "Add a weekly practice test",
        "Set aside time at the end of each week to work through practice problems without notes, then review every mistake and update your study plan.",
        "1 hour",
    ),
];

const PERSONAL: [Entry; CANONICAL_TASK_COUNT] = [
    (
        "Create a morning routine checklist",
        "List the three to five habits you want to start the day with, order them realistically and keep the checklist somewhere visible for the first two weeks.",
        "30 minutes",
    ),
    (
        "Set up a weekly review session",
        "Pick a fixed time each week to look back at what went well, what slipped and what the priorities are for the coming week.",
        "45 minutes",
    ),
    (
        "Improve one key habit with tracking",
        "Choose a single habit that matters most right now and record it daily in a simple tracker so progress stays visible and easy to adjust.",
        "15 minutes",
    ),
];

const GENERAL: [Entry; CANONICAL_TASK_COUNT] = [
    (
        "Define the goal and success criteria",
        "Write a short statement of what you want to achieve and how you will know it is done, including any deadline or measurable outcome.",
        "30 minutes",
    ),
    (
        "Create a step-by-step action plan",
        "Break the goal into small, concrete steps, order them by dependency and estimate how long each one will take.",
        "1 hour",
    ),
    (
        "Implement the first step today",
        "Pick the smallest step from the plan that moves things forward and complete it now to build momentum.",
        "1 hour",
    ),
];

fn entries(domain: TaskDomain) -> &'static [Entry; CANONICAL_TASK_COUNT] {
    match domain {
        TaskDomain::Website => &WEBSITE,
        TaskDomain::Business => &BUSINESS,
        TaskDomain::Education => &EDUCATION,
        TaskDomain::Personal => &PERSONAL,
        TaskDomain::General => &GENERAL,
    }
}

/// The three fallback tasks for a domain, with ids 1..=3.
pub fn fallback_tasks(domain: TaskDomain) -> Vec<Task> {
    entries(domain)
        .iter()
        .zip(1u32..)
        .map(|(&(title, description, estimate), id)| {
            Task::new(title, description, estimate).with_id(id)
        })
        .collect()
}

/// Lookup by domain name; unknown names fall through to `general`.
pub fn fallback_tasks_by_type(kind: &str) -> Vec<Task> {
    fallback_tasks(TaskDomain::parse_lenient(kind))
}

/// The fallback task at `index` for a domain, with its positional id.
pub fn fallback_task_at(domain: TaskDomain, index: usize) -> Task {
    let (title, description, estimate) = entries(domain)[index % CANONICAL_TASK_COUNT];
    Task::new(title, description, estimate).with_id(index as u32 + 1)
}

/// Clarifying question asked when the model cannot be reached while the
/// session is still gathering context.
pub fn fallback_question(domain: TaskDomain) -> &'static str {
    match domain {
        TaskDomain::Website => {
            "What is the address of the website, and what is the main thing you would like to improve about it?"
        }
        TaskDomain::Business => {
            "What stage is your business at right now, and what is the biggest challenge you are facing?"
        }
        TaskDomain::Education => {
            "What subject are you working on, and is there a deadline or exam coming up?"
        }
        TaskDomain::Personal => {
            "What goal would you like to make progress on, and how much time can you give it each week?"
        }
        TaskDomain::General => {
            "Could you tell me a bit more about what you want to achieve and any constraints you have?"
        }
    }
}
