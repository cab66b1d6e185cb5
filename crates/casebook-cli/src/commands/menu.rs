//! Interactive numbered menu over one in-memory session store.
//!
//! The store lives for the whole session; nothing reaches disk until the
//! user picks "Save". Numeric prompts re-ask until they get a number, and
//! end of input ends the session.

use crate::commands::case::{join_ids, priority_row};
use crate::support::{Context, export_undo_entries, load_store_or_exit};
use casebook_core::{CaseStore, Stage};
use std::io::{self, BufRead, Write};

const MENU: &str = "\
=========================================
       CASE MANAGEMENT SYSTEM
=========================================
1. Add Case
2. Delete Case
3. Update Case
4. View All Cases
5. Add Progress
6. Show Progress
7. Show Cases Ordered by ID
8. Save All Data to File
0. Exit
-----------------------------------------";

const STAGE_MENU: &str = "\
Available stages:
1. Case Registered
2. Under Investigation
3. Hearing Scheduled
4. Judgment Passed
5. Case Closed
(any other number: custom stage)";

pub fn run(ctx: &Context) {
    let store = load_store_or_exit(ctx);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = MenuSession::new(store, ctx.clone(), stdin.lock(), stdout.lock());
    if let Err(e) = session.run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

enum Flow {
    Continue,
    Exit,
}

pub struct MenuSession<R, W> {
    store: CaseStore,
    ctx: Context,
    input: R,
    output: W,
    exported: usize,
}

impl<R: BufRead, W: Write> MenuSession<R, W> {
    pub fn new(store: CaseStore, ctx: Context, input: R, output: W) -> Self {
        Self {
            store,
            ctx,
            input,
            output,
            exported: 0,
        }
    }

    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    /// Run until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            match self.step() {
                Ok(Flow::Continue) => writeln!(self.output)?,
                Ok(Flow::Exit) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    fn step(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "{MENU}")?;
        match self.read_int("Enter choice: ")? {
            1 => self.add_case()?,
            2 => self.delete_case()?,
            3 => self.update_case()?,
            4 => self.show_by_priority()?,
            5 => self.add_progress()?,
            6 => self.show_progress()?,
            7 => self.show_ordered()?,
            8 => self.save()?,
            0 => {
                writeln!(self.output, "\nExiting... Goodbye!")?;
                return Ok(Flow::Exit);
            }
            _ => writeln!(self.output, "\nInvalid choice!")?,
        }
        Ok(Flow::Continue)
    }

    fn add_case(&mut self) -> io::Result<()> {
        let id = self.read_int("Enter Case ID: ")?;
        if self.store.contains(id) {
            return writeln!(self.output, "Case already exists!");
        }
        let description = self.read_line("Enter Description: ")?;
        let priority = self.read_int("Enter Priority (lower = higher priority): ")?;
        match self.store.add(id, description, priority) {
            Ok(()) => writeln!(self.output, "\nCase added successfully."),
            Err(e) => writeln!(self.output, "\n{e}"),
        }
    }

    fn delete_case(&mut self) -> io::Result<()> {
        let id = self.read_int("Enter Case ID to delete: ")?;
        match self.store.delete(id) {
            Ok(_) => writeln!(self.output, "\nCase deleted."),
            Err(_) => writeln!(self.output, "Case not found!"),
        }
    }

    fn update_case(&mut self) -> io::Result<()> {
        let id = self.read_int("Enter Case ID to update: ")?;
        if !self.store.contains(id) {
            return writeln!(self.output, "Case not found!");
        }
        let description = self.read_line("Enter new Description: ")?;
        let priority = self.read_int("Enter new Priority: ")?;
        match self.store.update(id, description, priority) {
            Ok(()) => writeln!(self.output, "\nCase updated successfully."),
            Err(e) => writeln!(self.output, "\n{e}"),
        }
    }

    fn show_by_priority(&mut self) -> io::Result<()> {
        let rows = self.store.list_by_priority();
        if rows.is_empty() {
            return writeln!(self.output, "No cases available.");
        }
        writeln!(self.output, "\nPriority Order (lower = higher priority):")?;
        writeln!(self.output, "-----------------------------------------")?;
        for record in rows {
            writeln!(self.output, "{}", priority_row(record))?;
        }
        Ok(())
    }

    fn add_progress(&mut self) -> io::Result<()> {
        let id = self.read_int("Enter Case ID to add progress to: ")?;
        if !self.store.contains(id) {
            return writeln!(self.output, "Case not found!");
        }

        writeln!(self.output, "\n{STAGE_MENU}")?;
        let choice = self.read_int("Enter stage number (1-5): ")?;
        let stage = match Stage::from_menu_choice(choice) {
            Some(stage) => stage,
            None => Stage::from_label(&self.read_line("Enter custom stage: ")?),
        };

        if let Err(e) = self.store.append_progress(id, stage) {
            return writeln!(self.output, "\n{e}");
        }
        writeln!(self.output, "\nStage added successfully.")?;
        self.write_progress(id)
    }

    fn show_progress(&mut self) -> io::Result<()> {
        let id = self.read_int("Enter Case ID to show progress: ")?;
        match self.store.list_progress(id) {
            Err(_) => writeln!(self.output, "Case not found!"),
            Ok([]) => writeln!(self.output, "No progress recorded."),
            Ok(_) => self.write_progress(id),
        }
    }

    fn write_progress(&mut self, id: i64) -> io::Result<()> {
        writeln!(self.output, "Progress for Case ID {id}:")?;
        for stage in self.store.progress_log().list(id) {
            writeln!(self.output, "- {stage}")?;
        }
        Ok(())
    }

    fn show_ordered(&mut self) -> io::Result<()> {
        let ids = self.store.key_index().in_order();
        writeln!(self.output, "\nCases by id: {}", join_ids(&ids))
    }

    fn save(&mut self) -> io::Result<()> {
        let file = self.ctx.records_file();
        if let Err(e) = file.save(&self.store) {
            tracing::warn!(path = %file.path().display(), "save failed: {e}");
            return writeln!(self.output, "\nSave failed: {e}");
        }

        let pending = &self.store.undo_log().entries()[self.exported..];
        export_undo_entries(&self.ctx, pending);
        self.exported = self.store.undo_log().len();
        writeln!(
            self.output,
            "\nData saved to {} successfully.",
            file.path().display()
        )
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_int(&mut self, prompt: &str) -> io::Result<i64> {
        loop {
            let line = self.read_line(prompt)?;
            match line.trim().parse::<i64>() {
                Ok(value) => return Ok(value),
                Err(_) => writeln!(self.output, "Invalid input. Enter number again.")?,
            }
        }
    }
}
