//! 콘솔 리포터 포트 구현 어댑터.
//!
//! 진행 상황은 stderr, 리포트/JSON 같은 결과물은 stdout으로 나눈다.

use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

use crate::application::ports::Reporter;
use crate::domain::lens::Lens;

#[derive(Default)]
struct LensPanelState {
    in_lens_section: bool,
    rendered_lines: usize,
    /// 첫 보고 순서(= 병합 순서)를 유지한다.
    rows: Vec<(Lens, String, Option<String>)>,
}

impl LensPanelState {
    fn upsert(&mut self, lens: Lens, status: &str, extra: Option<&str>) {
        let row = (lens, status.to_string(), extra.map(str::to_string));
        match self.rows.iter_mut().find(|(existing, _, _)| *existing == lens) {
            Some(slot) => *slot = row,
            None => self.rows.push(row),
        }
    }
}

/// 콘솔 전용 리포터 어댑터.
pub struct ConsoleReporter {
    interactive: bool,
    quiet: bool,
    state: Mutex<LensPanelState>,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConsoleReporter {
    /// stderr가 TTY일 때 lens 상태판을 제자리에서 갱신한다.
    /// `quiet`이면 진행 상황은 출력하지 않고 결과물만 stdout에 쓴다.
    pub fn new(quiet: bool) -> Self {
        Self {
            interactive: io::stderr().is_terminal(),
            quiet,
            state: Mutex::new(LensPanelState::default()),
        }
    }

    fn set_section(&self, name: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.in_lens_section = name.starts_with("Lenses (");
            state.rows.clear();
            state.rendered_lines = 0;
        }
    }

    fn render_lens_panel(&self, state: &mut LensPanelState) {
        let mut out = io::stderr();
        if state.rendered_lines > 0 {
            let _ = write!(out, "\x1b[{}A\x1b[J", state.rendered_lines);
        }

        let mut lines = Vec::new();
        lines.push("┌────────────────── Lens Status ──────────────────┐".to_string());
        for (lens, status, extra) in &state.rows {
            let extra_text = extra.as_deref().unwrap_or("-");
            lines.push(format!(
                "│ {:<14} {} {:<18} │",
                lens.label(),
                colorize_status(&format!("{status:<14}"), status),
                extra_text
            ));
        }
        lines.push("└──────────────────────────────────────────────────┘".to_string());

        for line in &lines {
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
        state.rendered_lines = lines.len();
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, name: &str) {
        self.set_section(name);
        if self.quiet {
            return;
        }
        eprintln!();
        eprintln!("==================== {} ====================", name);
    }

    fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            eprintln!("{:<12}: {}", key, value);
        }
    }

    fn status(&self, scope: &str, message: &str) {
        if !self.quiet {
            eprintln!("[{:<12}] {}", scope, message);
        }
    }

    fn lens_status(&self, lens: Lens, status: &str, extra: Option<&str>) {
        if self.quiet {
            return;
        }
        if self.interactive
            && let Ok(mut state) = self.state.lock()
            && state.in_lens_section
        {
            state.upsert(lens, status, extra);
            self.render_lens_panel(&mut state);
            return;
        }

        // 비대화형 출력은 진행 중간 상태를 생략하고 완료 줄만 남긴다.
        if status == "running" && extra.is_some_and(|e| !e.starts_with("0/")) {
            return;
        }
        match extra {
            Some(extra) => eprintln!("[lens:{:<12}] {:<7} {}", lens.label(), status, extra),
            None => eprintln!("[lens:{:<12}] {}", lens.label(), status),
        }
    }

    fn raw(&self, line: &str) {
        println!("{}", line);
    }
}

fn colorize_status(padded: &str, status: &str) -> String {
    match status {
        "running" => format!("\x1b[33m{padded}\x1b[0m"),
        "done" => format!("\x1b[32m{padded}\x1b[0m"),
        "degraded" => format!("\x1b[31m{padded}\x1b[0m"),
        _ => padded.to_string(),
    }
}
