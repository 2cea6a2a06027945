//! Folder walk from the year folder down to today's spreadsheet
//!
//! The walk is four dependent lookups: year folder, month folder, day-wise
//! folder, then the spreadsheets inside it. Each step needs the id found by the
//! previous one, so the lookups run one after another and nothing is cached
//! between walks.
//!
//! When several spreadsheets carry today's token the first one in the order
//! Drive listed them wins. Drive does not promise a stable order for that
//! listing.

use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};

use crate::drive::{EntryQuery, FileRef, SheetRef};
use crate::error::{Error, LookupStep, Result};
use crate::service::TableService;

/// Default name of the folder holding one spreadsheet per day
pub const DAY_WISE_FOLDER: &str = "DayWiseSheets";

/// `today` as a zero-padded `DD-MM-YYYY` token
pub fn today_token(today: NaiveDate) -> String {
    today.format("%d-%m-%Y").to_string()
}

/// English month name used for the month folder, e.g. `June`
pub fn month_folder_name(today: NaiveDate) -> String {
    today.format("%B").to_string()
}

/// First file whose name contains today's token
pub fn find_today_sheet(files: &[FileRef], today: NaiveDate) -> Option<&FileRef> {
    let token = today_token(today);
    files.iter().find(|file| file.name.contains(&token))
}

/// Walks the folder hierarchy of a [`TableService`]
pub struct SheetLocator<'a, S: TableService + ?Sized> {
    service: &'a S,
    day_wise_folder: &'a str,
}

impl<'a, S: TableService + ?Sized> SheetLocator<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            day_wise_folder: DAY_WISE_FOLDER,
        }
    }

    /// Use a different name for the day-wise folder
    pub fn with_day_wise_folder(mut self, name: &'a str) -> Self {
        self.day_wise_folder = name;
        self
    }

    /// Find today's spreadsheet under `<year>/<month_folder>/<day-wise folder>`
    pub async fn locate_today_sheet(
        &self,
        access_token: &str,
        month_folder: &str,
        today: NaiveDate,
    ) -> Result<SheetRef> {
        let year = today.year().to_string();

        info!("Locating folder {}...", year);
        let year_folder = self
            .first(access_token, LookupStep::YearFolder, EntryQuery::folder(&year))
            .await?;

        info!("Locating folder {} inside {}...", month_folder, year);
        let month = self
            .first(
                access_token,
                LookupStep::MonthFolder,
                EntryQuery::folder(month_folder).in_parent(&year_folder.id),
            )
            .await?;

        info!("Locating folder {} inside {}...", self.day_wise_folder, month_folder);
        let day_wise = self
            .first(
                access_token,
                LookupStep::DayWiseFolder,
                EntryQuery::folder(self.day_wise_folder).in_parent(&month.id),
            )
            .await?;

        info!("Listing sheets in the {} folder...", self.day_wise_folder);
        let sheets = self
            .lookup(
                access_token,
                LookupStep::Sheets,
                EntryQuery::spreadsheets().in_parent(&day_wise.id),
            )
            .await?;
        if sheets.is_empty() {
            warn!("No sheets found in the {} folder", self.day_wise_folder);
            return Err(Error::NotFound(LookupStep::Sheets));
        }

        match find_today_sheet(&sheets, today) {
            Some(sheet) => {
                debug!("Today's sheet is {} ({})", sheet.name, sheet.id);
                Ok(sheet.clone())
            }
            None => {
                warn!("No sheet found for {}", today_token(today));
                Err(Error::NotFound(LookupStep::TodaySheet))
            }
        }
    }

    async fn lookup(
        &self,
        access_token: &str,
        step: LookupStep,
        query: EntryQuery,
    ) -> Result<Vec<FileRef>> {
        self.service
            .find_entries(access_token, &query)
            .await
            .map_err(|e| {
                warn!("Lookup of {} failed: {}", step, e);
                Error::NotFound(step)
            })
    }

    async fn first(&self, access_token: &str, step: LookupStep, query: EntryQuery) -> Result<FileRef> {
        let mut found = self.lookup(access_token, step, query).await?;
        if found.is_empty() {
            warn!("{} not found", step);
            return Err(Error::NotFound(step));
        }
        Ok(found.swap_remove(0))
    }
}
