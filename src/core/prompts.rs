//! Prompt text for each document kind. The simplified variants are used for the
//! second pipeline attempt: smaller structure, explicit minimal schema, no code.

const JSON_ONLY: &str = "IMPORTANT: Return ONLY valid JSON without any additional text, markdown formatting, or code blocks.";

pub fn roadmap(course_title: &str, level: &str) -> String {
    format!(
        r#"Generate a structured course roadmap for a {level} level course titled "{course_title}".

Respond with a JSON object shaped like this example:
{{"course_title": "Frontend Developer",
  "description": "Learn how to build modern, responsive websites using HTML, CSS, and JavaScript.",
  "level": "Beginner",
  "duration": "3 months",
  "modules": [
    {{"module_title": "Introduction to Web", "topics": ["How the Web Works", "Browsers and Servers", "HTTP Basics"]}},
    {{"module_title": "HTML Basics", "topics": ["HTML Tags", "Forms", "Semantic HTML"]}}
  ]}}

Requirements:
1. "course_title" matches the requested title
2. "description" is short but informative
3. "level" is exactly "{level}"
4. "duration" is realistic, e.g. "3 months" or "6 weeks"
5. 4 to 6 modules in a logical progression, each with relevant topics

{JSON_ONLY}"#
    )
}

pub fn roadmap_simplified(course_title: &str, level: &str) -> String {
    format!(
        r#"Create a short roadmap for the {level} course "{course_title}".

Return ONLY a JSON object with exactly these keys:
{{"course_title": "{course_title}", "description": "One sentence.", "level": "{level}", "duration": "4 weeks",
  "modules": [{{"module_title": "Module 1", "topics": ["Topic A", "Topic B"]}}]}}

Use plain text only. Check that every quote, bracket and comma is in place.
{JSON_ONLY}"#
    )
}

pub fn tutorial(topic: &str, level: &str, format_type: &str) -> String {
    format!(
        r#"Generate a structured {format_type} about "{topic}" for a {level} level learner.

Respond with a JSON object shaped like this example:
{{
  "title": "Understanding JavaScript Promises",
  "level": "{level}",
  "estimated_time": "15 minutes",
  "overview": "How JavaScript Promises work and how to use them for asynchronous operations.",
  "prerequisites": ["Basic JavaScript knowledge"],
  "sections": [
    {{
      "section_title": "What are Promises?",
      "content": "A Promise represents the eventual completion or failure of an asynchronous operation.",
      "code_example": "console.log('Simple example');"
    }}
  ],
  "practice_exercises": ["Create a Promise that resolves after one second"],
  "additional_resources": [
    {{"title": "MDN Web Docs: Promise", "url": "https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Promise"}}
  ]
}}

Requirements:
1. A descriptive title and a realistic estimated time
2. 3 to 5 detailed sections, with code examples where they help
3. Prerequisites, practice exercises and additional resources

Formatting rules for code examples:
- keep them short and simple, one line if possible
- write \n instead of real line breaks
- no docstrings, decorators or backticks

{JSON_ONLY}"#
    )
}

pub fn tutorial_simplified(topic: &str, level: &str, format_type: &str) -> String {
    format!(
        r#"Generate a simple and clean {format_type} about "{topic}" for a {level} level learner.

Return ONLY a JSON object with this structure:
{{
  "title": "Simple title",
  "level": "{level}",
  "estimated_time": "15-30 minutes",
  "overview": "Brief overview of the topic.",
  "prerequisites": ["Basic knowledge"],
  "sections": [
    {{"section_title": "Introduction", "content": "Simple explanation without code."}},
    {{"section_title": "Key Concepts", "content": "Basic information about the topic."}}
  ],
  "practice_exercises": ["Simple practice exercise"],
  "additional_resources": [{{"title": "Resource", "url": "https://example.com"}}]
}}

Do not include code examples or special characters.
{JSON_ONLY}"#
    )
}

pub fn tutorial_markdown(topic: &str, level: &str) -> String {
    format!(
        r###"Write a tutorial about "{topic}" for a {level} level learner in Markdown.

Structure:
# Title
## Overview
## Prerequisites
## Sections (3 to 5, each with a "##" heading, explanation and short fenced code examples where useful)
## Practice Exercises
## Additional Resources

Return only the Markdown document, without any introduction or closing remarks."###
    )
}

pub fn quiz(topic: &str, level: &str, count: u32) -> String {
    format!(
        r#"Generate a quiz about "{topic}" for a {level} level learner with {count} multiple-choice questions.

Respond with a JSON object shaped like this example:
{{
  "title": "Quiz on JavaScript Promises",
  "description": "Test your knowledge of JavaScript Promises.",
  "level": "{level}",
  "questions": [
    {{
      "question": "What does a JavaScript Promise represent?",
      "options": [
        "A guaranteed return value",
        "The eventual completion or failure of an asynchronous operation",
        "A special JavaScript function",
        "A type of callback function"
      ],
      "correct_answer": "The eventual completion or failure of an asynchronous operation",
      "explanation": "A Promise represents the eventual completion or failure of an asynchronous operation."
    }}
  ]
}}

Requirements:
1. Exactly {count} questions about {topic}
2. Each question has exactly 4 options
3. "correct_answer" is copied verbatim from one of the options
4. Each question has a brief explanation

Describe formulas in plain words and avoid special symbols.
{JSON_ONLY}"#
    )
}

pub fn quiz_simplified(topic: &str, level: &str, count: u32) -> String {
    format!(
        r#"Generate a simple quiz about "{topic}" with {count} multiple-choice questions.

Return ONLY a JSON object with this structure:
{{
  "title": "Quiz on {topic}",
  "description": "Test your knowledge of {topic}.",
  "level": "{level}",
  "questions": [
    {{
      "question": "Simple question about {topic}?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correct_answer": "Option B",
      "explanation": "Brief explanation of why B is correct."
    }}
  ]
}}

Check that every quote, bracket and comma is in place.
{JSON_ONLY}"#
    )
}
