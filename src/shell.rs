//! Numbered-menu session driving a [`MemberRegistry`].

use std::io::{self, BufRead, Write};

use crate::{
    core::registry::{MemberRegistry, StoreError},
    member::{MemberDraft, MemberRecord},
    types::MemberId,
};

enum Flow {
    Continue,
    Quit,
}

/// Interactive menu over any line reader and writer.
///
/// The session ends on `q`/`Q` or when input runs out. The registry is left
/// in whatever state the session produced; saving is up to the caller.
pub struct Shell<'a, R, W> {
    registry: &'a mut MemberRegistry,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    /// Session over `registry` reading from `input`, printing to `output`.
    pub fn new(registry: &'a mut MemberRegistry, input: R, output: W) -> Self {
        Self {
            registry,
            input,
            output,
        }
    }

    /// Runs the menu loop until quit or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt("\n> ")? else {
                return Ok(());
            };

            let flow = match choice.chars().next() {
                Some('1') => self.add_member()?,
                Some('2') => self.remove_member()?,
                Some('3') => self.search_member()?,
                Some('4') => self.list_members()?,
                Some('q' | 'Q') => return Ok(()),
                _ => {
                    writeln!(self.output, "Invalid input.")?;
                    Flow::Continue
                }
            };

            if let Flow::Quit = flow {
                return Ok(());
            }
            writeln!(self.output, "\nPress enter to continue.")?;
            if self.read_line()?.is_none() {
                return Ok(());
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(
            self.output,
            "\n\t\tMEMBER REGISTRY\n\nPlease choose an option:\n\n  1.\tAdd a new member\n  2.\tRemove a member\n  3.\tSearch for a member\n  4.\tView all members\nPress 'q' to quit."
        )
    }

    fn add_member(&mut self) -> io::Result<Flow> {
        let Some(first) = self.prompt_nonempty("\nEnter member's first name: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(last) = self.prompt_nonempty("Enter member's last name: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(email) = self.prompt_nonempty("Enter member's email address: ")? else {
            return Ok(Flow::Quit);
        };

        match self.registry.insert(MemberDraft::new(&first, &last, &email)) {
            Ok(id) => {
                if let Some(rec) = self.registry.get(id).cloned() {
                    self.print_member(&rec, &format!("\n{} was added!", rec.full_name()))?;
                }
            }
            Err(StoreError::DuplicateMember { .. }) => {
                writeln!(
                    self.output,
                    "\nSorry, looks like '{first} {last}' is already in our system."
                )?;
            }
            Err(err) => writeln!(self.output, "\nSorry, {first} {last} cannot be added: {err}.")?,
        }
        Ok(Flow::Continue)
    }

    fn remove_member(&mut self) -> io::Result<Flow> {
        let Some(raw) = self.prompt("\nEnter the member's ID to remove: ")? else {
            return Ok(Flow::Quit);
        };
        let Ok(id) = raw.parse::<MemberId>() else {
            writeln!(self.output, "Invalid input.")?;
            return Ok(Flow::Continue);
        };

        match self.registry.remove(id) {
            Ok(rec) => writeln!(
                self.output,
                "\nMember: {:06}\t{} removed.",
                rec.id,
                rec.full_name()
            )?,
            Err(_) => writeln!(self.output, "\nNo matching ID found")?,
        }
        Ok(Flow::Continue)
    }

    fn search_member(&mut self) -> io::Result<Flow> {
        let Some(first) = self.prompt_nonempty("\nEnter member's first name: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(last) = self.prompt_nonempty("Enter member's last name: ")? else {
            return Ok(Flow::Quit);
        };

        let Ok(found) = self.registry.find_by_name(&first, &last).cloned() else {
            writeln!(self.output, "\nMember not found: {first} {last}")?;
            return Ok(Flow::Continue);
        };

        self.print_member(&found, "\nMember found!")?;
        writeln!(self.output, "Change email address? (Y/N)")?;
        let Some(choice) = self.prompt("> ")? else {
            return Ok(Flow::Quit);
        };
        if !choice.eq_ignore_ascii_case("y") {
            return Ok(Flow::Continue);
        }

        let Some(email) = self.prompt_nonempty("Enter the new email: ")? else {
            return Ok(Flow::Quit);
        };
        match self.registry.update_email(found.id, &email).cloned() {
            Ok(rec) => self.print_member(&rec, "\nEmail changed!")?,
            Err(err) => writeln!(self.output, "\nEmail not changed: {err}.")?,
        }
        Ok(Flow::Continue)
    }

    fn list_members(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "Members:")?;
        if self.registry.is_empty() {
            writeln!(self.output, "No members registered.")?;
        }
        for rec in self.registry.iter() {
            writeln!(self.output, "{rec}")?;
        }
        Ok(Flow::Continue)
    }

    fn print_member(&mut self, rec: &MemberRecord, caption: &str) -> io::Result<()> {
        writeln!(self.output, "{caption}")?;
        writeln!(self.output, "{rec}")
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Re-prompts until a non-blank answer arrives.
    fn prompt_nonempty(&mut self, text: &str) -> io::Result<Option<String>> {
        loop {
            match self.prompt(text)? {
                Some(answer) if answer.is_empty() => writeln!(self.output, "Invalid input.")?,
                other => return Ok(other),
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
