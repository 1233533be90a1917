//! `coder status`: reads `.coder/loop-state.json` and
//! `.coder/workflow-state.json` without taking any lock.

use crate::prelude::*;

#[test]
fn empty_workspace_reports_no_state() {
    let ws = Workspace::empty();

    ws.coder().args(&["status"]).passes().stdout_has("no loop state recorded");
}

#[test]
fn reports_the_recorded_summary_and_current_issue() {
    let ws = Workspace::empty();
    ws.file(
        ".coder/loop-state.json",
        r#"{
            "runId": "run-test0000000000001",
            "status": "running",
            "issueQueue": [
                {
                    "source": "local",
                    "id": "issue-1",
                    "title": "Fix the thing",
                    "dependsOn": [],
                    "outcome": { "status": "completed", "branch": "feat/issue-1" }
                },
                {
                    "source": "local",
                    "id": "issue-2",
                    "title": "Fix the other thing",
                    "dependsOn": [],
                    "outcome": { "status": "in_progress" }
                }
            ],
            "currentIndex": 1,
            "currentStage": "develop.planning",
            "startedAt": 1000
        }"#,
    );

    ws.coder()
        .args(&["status"])
        .passes()
        .stdout_has("status=running")
        .stdout_has("completed=1")
        .stdout_has("current stage: develop.planning")
        .stdout_has("issue-2");
}
