// src/catalog.rs

//! Static subject catalog. Serves three roles: the subjects listing, the
//! fallback question bank when AI generation fails, and the raw-id answer
//! key for grading submissions without a live quiz instance.

use crate::models::question::Question;

/// A subject with its fixed question bank.
#[derive(Debug)]
pub struct SubjectQuiz {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Topic list fed into the AI generation prompt.
    pub topics: &'static str,
    /// Advisory time limit in seconds; enforced client-side only.
    pub time_limit: i64,
    pub questions: Vec<Question>,
}

#[derive(Debug)]
pub struct Catalog {
    subjects: Vec<SubjectQuiz>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            subjects: vec![javascript(), databases(), react(), nodejs()],
        }
    }

    pub fn subject(&self, id: &str) -> Option<&SubjectQuiz> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn subjects(&self) -> &[SubjectQuiz] {
        &self.subjects
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn javascript() -> SubjectQuiz {
    SubjectQuiz {
        id: "javascript",
        title: "JavaScript",
        description: "Test your knowledge of JavaScript fundamentals, ES6+ and asynchronous programming",
        topics: "variables, functions, closures, prototypes, ES6+, async/await, DOM, event loop, promises, arrays, objects",
        time_limit: 600,
        questions: vec![
            Question::new(
                "js-1",
                "What does `typeof null` evaluate to?",
                ["\"null\"", "\"object\"", "\"undefined\"", "\"number\""],
                1,
                "A long-standing quirk of the language: null is reported as \"object\".",
            ),
            Question::new(
                "js-2",
                "What happens when you reassign a variable declared with `const`?",
                [
                    "The new value is silently ignored",
                    "The variable becomes undefined",
                    "A TypeError is thrown",
                    "It works like `let`",
                ],
                2,
                "const bindings cannot be reassigned; doing so throws a TypeError at runtime.",
            ),
            Question::new(
                "js-3",
                "A closure is a function that...",
                [
                    "runs immediately after being defined",
                    "retains access to the scope it was created in",
                    "has no access to outer variables",
                    "is always asynchronous",
                ],
                1,
                "Closures capture their lexical environment, keeping outer variables alive.",
            ),
            Question::new(
                "js-4",
                "Which comparison is true: `'1' == 1` or `'1' === 1`?",
                ["Both", "Only ==", "Only ===", "Neither"],
                1,
                "== coerces types before comparing, === requires both type and value to match.",
            ),
            Question::new(
                "js-5",
                "What does `Promise.all` do when one of its promises rejects?",
                [
                    "Waits for the rest, then resolves",
                    "Rejects immediately with that reason",
                    "Resolves with partial results",
                    "Retries the rejected promise",
                ],
                1,
                "Promise.all is fail-fast: the first rejection rejects the combined promise.",
            ),
        ],
    }
}

fn databases() -> SubjectQuiz {
    SubjectQuiz {
        id: "databases",
        title: "Databases",
        description: "Test your knowledge of SQL, NoSQL, indexing and transactions",
        topics: "SQL, NoSQL, MongoDB, indexing, normalization, ACID, transactions, queries, joins, aggregation, schemas",
        time_limit: 600,
        questions: vec![
            Question::new(
                "db-1",
                "What does the 'A' in ACID stand for?",
                ["Availability", "Atomicity", "Aggregation", "Authorization"],
                1,
                "Atomicity: a transaction either applies completely or not at all.",
            ),
            Question::new(
                "db-2",
                "Which JOIN returns all rows from the left table and matching rows from the right?",
                ["INNER JOIN", "LEFT JOIN", "RIGHT JOIN", "CROSS JOIN"],
                1,
                "LEFT JOIN keeps every left-side row, filling unmatched right-side columns with NULL.",
            ),
            Question::new(
                "db-3",
                "What is the primary purpose of a database index?",
                [
                    "Enforcing foreign keys",
                    "Compressing table data",
                    "Speeding up lookups at the cost of extra writes",
                    "Backing up the table",
                ],
                2,
                "Indexes trade write overhead and storage for much faster reads.",
            ),
            Question::new(
                "db-4",
                "MongoDB stores records as...",
                ["Rows in tables", "BSON documents in collections", "Key/value pairs only", "Column families"],
                1,
                "MongoDB is a document store: BSON documents grouped into collections.",
            ),
            Question::new(
                "db-5",
                "First normal form (1NF) requires that...",
                [
                    "every table has a composite key",
                    "each column holds atomic, non-repeating values",
                    "all data lives in a single table",
                    "no NULL values exist",
                ],
                1,
                "1NF forbids repeating groups; every cell holds a single atomic value.",
            ),
        ],
    }
}

fn react() -> SubjectQuiz {
    SubjectQuiz {
        id: "react",
        title: "React.js",
        description: "Test your knowledge of components, hooks and React state management",
        topics: "components, hooks, state, props, JSX, virtual DOM, lifecycle, context, Redux basics, React Router, performance",
        time_limit: 600,
        questions: vec![
            Question::new(
                "react-1",
                "What does `useState` return?",
                [
                    "The current state value only",
                    "A setter function only",
                    "A pair: current value and a setter",
                    "A mutable ref object",
                ],
                2,
                "useState returns [value, setValue]; calling the setter schedules a re-render.",
            ),
            Question::new(
                "react-2",
                "Props in React are...",
                [
                    "mutable by the receiving component",
                    "read-only inputs passed from the parent",
                    "shared global state",
                    "only strings",
                ],
                1,
                "Props flow down and are read-only; state is what a component owns and changes.",
            ),
            Question::new(
                "react-3",
                "Why does React ask for a `key` prop on list items?",
                [
                    "For CSS styling",
                    "To identify items across re-renders for efficient reconciliation",
                    "To sort the list",
                    "It is required syntax for JSX",
                ],
                1,
                "Stable keys let the reconciler match old and new children instead of re-creating them.",
            ),
            Question::new(
                "react-4",
                "When does the cleanup function returned from `useEffect` run?",
                [
                    "Never",
                    "Before the effect re-runs and on unmount",
                    "On every render, before paint",
                    "Only on the first render",
                ],
                1,
                "React invokes the cleanup before re-running the effect and when the component unmounts.",
            ),
            Question::new(
                "react-5",
                "The virtual DOM is...",
                [
                    "a browser feature React depends on",
                    "an in-memory tree React diffs to compute minimal DOM updates",
                    "a copy of the DOM stored on the server",
                    "deprecated since hooks",
                ],
                1,
                "React renders to a lightweight in-memory tree and applies only the diff to the real DOM.",
            ),
        ],
    }
}

fn nodejs() -> SubjectQuiz {
    SubjectQuiz {
        id: "nodejs",
        title: "Node.js",
        description: "Test your knowledge of the Node.js runtime, Express and REST APIs",
        topics: "event loop, modules, npm, Express, middleware, REST APIs, streams, buffers, file system, authentication",
        time_limit: 600,
        questions: vec![
            Question::new(
                "node-1",
                "How does Node.js handle many concurrent connections on a single thread?",
                [
                    "It spawns one OS thread per connection",
                    "Through an event loop with non-blocking I/O",
                    "By queueing requests until the previous one finishes",
                    "It cannot; a load balancer is required",
                ],
                1,
                "Node multiplexes I/O on the event loop; callbacks run when operations complete.",
            ),
            Question::new(
                "node-2",
                "In an Express middleware, what does calling `next()` do?",
                [
                    "Sends the response",
                    "Passes control to the next middleware in the chain",
                    "Restarts the request",
                    "Closes the connection",
                ],
                1,
                "Middlewares form a pipeline; next() hands the request to the following handler.",
            ),
            Question::new(
                "node-3",
                "What is the role of `module.exports`?",
                [
                    "Defines what a CommonJS module exposes to require()",
                    "Lists npm dependencies",
                    "Configures the V8 engine",
                    "Registers a global variable",
                ],
                0,
                "Whatever is assigned to module.exports is what require() returns for that file.",
            ),
            Question::new(
                "node-4",
                "Streams are preferable to reading a whole file into memory because they...",
                [
                    "are always faster for small files",
                    "process data in chunks with bounded memory",
                    "skip error handling",
                    "work only with text data",
                ],
                1,
                "Streams push chunks through the pipeline, keeping memory usage flat for large inputs.",
            ),
            Question::new(
                "node-5",
                "Which statement about `package-lock.json` is true?",
                [
                    "It lists only devDependencies",
                    "It pins the exact dependency tree for reproducible installs",
                    "It is regenerated on every require()",
                    "It replaces package.json",
                ],
                1,
                "The lockfile records resolved versions so installs are reproducible across machines.",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_all_four_subjects() {
        let catalog = Catalog::new();
        for id in ["javascript", "databases", "react", "nodejs"] {
            assert!(catalog.subject(id).is_some(), "missing subject {}", id);
        }
        assert!(catalog.subject("cobol").is_none());
    }

    #[test]
    fn every_question_is_well_formed() {
        let catalog = Catalog::new();
        for subject in catalog.subjects() {
            assert!(!subject.questions.is_empty());
            for q in &subject.questions {
                assert_eq!(q.options.len(), 4, "question {} must have 4 options", q.id);
                assert!(
                    (0..4).contains(&q.correct_answer),
                    "question {} has out-of-range key",
                    q.id
                );
                assert!(!q.explanation.is_empty());
            }
        }
    }

    #[test]
    fn question_ids_are_unique_across_the_catalog() {
        let catalog = Catalog::new();
        let mut seen = std::collections::HashSet::new();
        for subject in catalog.subjects() {
            for q in &subject.questions {
                assert!(seen.insert(q.id.clone()), "duplicate id {}", q.id);
            }
        }
    }
}
