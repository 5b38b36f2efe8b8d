//! Prompt templates for the pipeline's completion calls.

/// Extract graph search keywords from a question.
pub const EXTRACT_KEYWORDS_PROMPT: &str = "\
You are extracting graph search terms from a user question.

Question:
{text}

Return up to {max_keywords} keywords on a single line, pipe-separated
(keyword1|keyword2|...). Prefer the most specific nouns and identifiers in
the question. Do not add commentary.";

/// Grounded answer generation over retrieved evidence.
pub const ANSWER_QUESTION_PROMPT: &str = "\
You are answering a question about a software bill of materials. Use only
the evidence below.

Sources:
{sources}

Facts:
{facts}

Question: {text}

First list the quotes relevant to the question, numbered. Then give the
final answer on a new line starting with 'Answer:', citing quote numbers in
square brackets like [1, 3] after each claim. If the evidence does not
answer the question, say so.";

/// Judge whether an answer fully addresses its question.
pub const EVALUATE_COMPLETENESS_PROMPT: &str = "\
You are evaluating whether an answer fully addresses a question, given the
search results the answer was drawn from.

Question: {question}

Answer: {answer}

Search results:
{searchResults}

Respond with exactly these tags:
<answerSatisfiesQuestion>yes or no</answerSatisfiesQuestion>
<reason>why</reason>
<statements>one line per statement in the answer</statements>
<additionalStatements>one line per relevant statement found in the search
results but missing from the answer</additionalStatements>
<improvedAnswer>a version of the answer including the missing statements</improvedAnswer>";

/// Judge whether each answer statement is supported by the search results.
pub const EVALUATE_FAITHFULNESS_PROMPT: &str = "\
You are evaluating whether an answer is faithful to the search results it
was drawn from.

Question: {question}

Answer: {answer}

Search results:
{searchResults}

For each statement in the answer, emit one line:
<evaluation>fully supported|partially supported|unsupported - the statement</evaluation>";
