//! Prompt templates sent to the chat model.
//!
//! The batch prompt asks for headed sections in a fixed order. The headings
//! are the same constants the extractor searches for, so the two stay in step.

use super::types::Comment;

pub const GENERAL_SUMMARY: &str = "General Summary";
pub const POSITIVE_POINTS: &str = "Positive Points";
pub const NEGATIVE_POINTS: &str = "Negative Points";
pub const REPEATING_TOPICS: &str = "Repeating Topics";
pub const SENTIMENT_ANALYSIS: &str = "Sentiment Analysis";

/// Headings in the order the model is asked to emit them.
pub const SECTION_ORDER: [&str; 5] = [
    GENERAL_SUMMARY,
    POSITIVE_POINTS,
    NEGATIVE_POINTS,
    REPEATING_TOPICS,
    SENTIMENT_ANALYSIS,
];

pub fn build_batch_prompt(comments: &[Comment]) -> String {
    let listing: String = comments
        .iter()
        .map(|c| {
            format!(
                "⭐ Rating: {}/5\n👤 Author: {}\n💬 Text: {}\n\n",
                c.rating, c.author, c.text
            )
        })
        .collect();

    format!(
        r#"You are a professional user comment analyst. Your task is to analyze the following comments in detail and comprehensively.

User Comments:
{listing}
Please provide a complete analysis with exactly these five sections, in this order:

1. {GENERAL_SUMMARY} (2-3 sentences):
- What is the overall opinion of the users?
- What is the general level of satisfaction?

2. {POSITIVE_POINTS} (at least 3):
- What were the things that the users approved of?
- What are the main strengths?

3. {NEGATIVE_POINTS} (at least 3):
- What were the problems raised?
- What are the weaknesses?

4. {REPEATING_TOPICS} (at least 2):
- What did the users talk about the most?
- What are the most frequent topics?

5. {SENTIMENT_ANALYSIS}:
- What percentage of comments are positive?
- What percentage of comments are negative?
- What is the overall sentiment?

Write every section heading exactly as given above, in English, and do not reorder or skip sections.
Use bullet points starting with "-" inside each section.
Apart from the headings, the answer should be completely in Persian and fluent.
"#
    )
}

pub fn build_summary_prompt(comments: &[Comment]) -> String {
    let listing = comments
        .iter()
        .map(|c| format!("⭐ {}/5 - {}:\n{}", c.rating, c.author, c.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a Persian AI assistant tasked with summarizing user comments.

User Comments:
{listing}

Please write a short summary (maximum 3 lines) of the user comments that:
1. is useful and practical
2. includes the main positive and negative points
3. is in simple and fluent Persian

Summary:"#
    )
}

pub fn build_detail_prompt(comment: &Comment) -> String {
    format!(
        r#"Perform a detailed analysis of this comment:

Comment: {text}
Rating: {rating}/5

Please specify the following:
1. Overall sentiment (positive/negative/neutral)
2. Important key phrases
3. Main topics mentioned

Respond ONLY with a single JSON object containing exactly these keys:
{{
  "sentiment": "positive" or "negative" or "neutral",
  "keyPhrases": ["phrase 1", "phrase 2"],
  "topics": ["topic 1", "topic 2"]
}}"#,
        text = comment.text,
        rating = comment.rating,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i32, author: &str, text: &str, rating: i32) -> Comment {
        Comment {
            id,
            author: author.to_string(),
            text: text.to_string(),
            rating,
            ..Comment::default()
        }
    }

    #[test]
    fn batch_prompt_lists_every_comment() {
        let prompt = build_batch_prompt(&[
            comment(1, "علی احمدی", "محصول فوق‌العاده‌ای بود", 5),
            comment(2, "رضا نوری", "انتظار بیشتری داشتم", 3),
        ]);

        assert!(prompt.contains("⭐ Rating: 5/5\n👤 Author: علی احمدی\n💬 Text: محصول فوق‌العاده‌ای بود"));
        assert!(prompt.contains("⭐ Rating: 3/5\n👤 Author: رضا نوری\n💬 Text: انتظار بیشتری داشتم"));
    }

    #[test]
    fn batch_prompt_requests_sections_in_extraction_order() {
        let prompt = build_batch_prompt(&[comment(1, "a", "b", 4)]);
        let positions: Vec<usize> = SECTION_ORDER
            .iter()
            .map(|label| prompt.find(label).expect("heading missing from prompt"))
            .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn bodies_are_passed_through_untouched() {
        let long = "کیفیت ".repeat(5_000);
        let odd = "{\"braces\"} and `ticks` \\ and \"quotes\"";

        let prompt = build_batch_prompt(&[comment(1, "x", &long, 5), comment(2, "y", "", 1)]);
        assert!(prompt.contains(&long));
        assert!(prompt.contains("💬 Text: \n"));

        let detail = build_detail_prompt(&comment(3, "z", odd, 2));
        assert!(detail.contains(&format!("Comment: {odd}\n")));
        assert!(detail.contains("Rating: 2/5"));
    }

    #[test]
    fn detail_prompt_names_the_json_keys() {
        let prompt = build_detail_prompt(&comment(1, "a", "ارسال سریع بود", 5));
        for key in ["\"sentiment\"", "\"keyPhrases\"", "\"topics\""] {
            assert!(prompt.contains(key), "missing {key}");
        }
        assert!(prompt.contains("{\n  \"sentiment\""));
    }

    #[test]
    fn summary_prompt_separates_comments_with_blank_lines() {
        let prompt = build_summary_prompt(&[comment(1, "A", "one", 5), comment(2, "B", "two", 2)]);
        assert!(prompt.contains("⭐ 5/5 - A:\none\n\n⭐ 2/5 - B:\ntwo"));
        assert!(prompt.trim_end().ends_with("Summary:"));
    }
}
