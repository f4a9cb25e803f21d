//! Prompt templates sent to the agents

/// Prompt for the keywords agent
pub fn hashtag_prompt(description: &str) -> String {
    format!("Generate hashtags for: {}", description)
}

/// Prompt for the collector agent
pub fn collection_prompt(hashtags: &[String], description: &str) -> String {
    format!(
        "Collect Twitter data using hashtags: {} for: {}",
        hashtags.join(", "),
        description
    )
}

/// Prompt asking the oracle agent for the three strongest signals
pub fn signal_generation_prompt(twitter_summary: &str) -> String {
    format!(
        r#"GENERATE_TOP3_SIGNALS: Identify the three strongest market signals in the collected Twitter data.

**Twitter Data Analysis:**
{twitter_summary}

Return exactly three signals as hashtags, ranked from strongest to weakest, each followed by a one-line justification grounded in the data above."#
    )
}

/// Prompt for the insights agent's critical review of the idea
pub fn critical_analysis_prompt(description: &str, hashtags: &[String], twitter_summary: &str) -> String {
    format!(
        r#"CRITICAL_ANALYSIS: Analyze this business idea for Web3 entrepreneurs with a critical and balanced perspective based on the collected Twitter data:

**Business Context:** {description}
**Target Hashtags:** {hashtags}

**Twitter Data Analysis:**
{twitter_summary}

Please provide a critical analysis that includes:

1. **Market Sentiment Analysis** (based on Twitter data)
   - Overall sentiment trends
   - Key concerns and challenges mentioned
   - Positive signals and opportunities

2. **Market Risks and Challenges** (identified from social data)
   - Regulatory concerns mentioned
   - Technical challenges discussed
   - Market volatility indicators
   - Competition insights

3. **Potential Obstacles and Limitations**
   - Scalability issues mentioned
   - User adoption challenges
   - Resource requirements
   - Technology dependencies

4. **Competitive Landscape Considerations**
   - Existing solutions discussed
   - Market saturation indicators
   - Differentiation challenges
   - Entry barriers

5. **Realistic Opportunities** (based on social sentiment)
   - Valid use cases mentioned
   - Market gaps identified
   - Partnership potential
   - Revenue streams

6. **Potential Failure Points to Watch For**
   - Common pitfalls mentioned
   - Risk factors identified
   - Warning signs from community
   - Mitigation strategies

7. **Balanced Recommendations**
   - Strategic approach based on data
   - Risk management
   - Resource allocation
   - Timeline considerations

Be objective, data-driven, and base your analysis on the actual Twitter data collected. Focus on actionable insights that help entrepreneurs make informed decisions."#,
        hashtags = hashtags.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        vec!["#DeFi".to_string(), "#Web3".to_string()]
    }

    #[test]
    fn test_simple_prompts() {
        assert_eq!(hashtag_prompt("A DEX"), "Generate hashtags for: A DEX");
        assert_eq!(
            collection_prompt(&tags(), "A DEX"),
            "Collect Twitter data using hashtags: #DeFi, #Web3 for: A DEX"
        );
    }

    #[test]
    fn test_analysis_prompt_sections() {
        let prompt = critical_analysis_prompt("A DEX", &tags(), "Total Tweets: 8");
        assert!(prompt.starts_with("CRITICAL_ANALYSIS:"));
        assert!(prompt.contains("**Business Context:** A DEX"));
        assert!(prompt.contains("**Target Hashtags:** #DeFi, #Web3"));
        assert!(prompt.contains("Total Tweets: 8"));
        assert!(prompt.contains("7. **Balanced Recommendations**"));
    }

    #[test]
    fn test_signal_prompt_includes_summary() {
        let prompt = signal_generation_prompt("Total Engagement: 42");
        assert!(prompt.starts_with("GENERATE_TOP3_SIGNALS:"));
        assert!(prompt.contains("Total Engagement: 42"));
    }
}
