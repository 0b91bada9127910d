//! Worksheet builder: runs the question pass and the answer pass for one drill.
//!
//! Flow: validate spec → compute question grid → for every page and cell,
//! generate a question and draw it → replay the `QuestionSet` onto answer
//! pages → stamp page numbers.
//!
//! Everything here is synchronous and pure apart from the injected random
//! source; the HTTP layer runs it inside `spawn_blocking`.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::drill::answers::{
    answer_list, answer_page_count, compute_answer, format_answer, AnswerEntry, AnswerPaginator,
};
use crate::drill::difficulty::{Difficulty, DrillStyle, Operator};
use crate::drill::layout::{cell_origin, compute_grid, CellGeometry, GridConfig, PageGeometry};
use crate::drill::question::{digit_range, NumberSource, Question, QuestionGenerator, QuestionSet};
use crate::errors::DrillError;
use crate::render::assets::AssetLocator;
use crate::render::commands::{
    Align, Canvas, Color, FontFace, PathSegment, RenderCommand, Stroke, TextStyle,
};
use crate::render::font_metrics::text_width;

/// Space above the question grid for the header, title band and instructions.
pub const QUESTION_HEADER_HEIGHT: f32 = 169.0;
/// Space above the answer grid for the answer-sheet heading.
pub const ANSWER_HEADER_HEIGHT: f32 = 69.0;

const TITLE_OFFSET: f32 = 42.0;
const TITLE_IMAGE_WIDTH: f32 = 90.0;
const TITLE_GAP: f32 = 10.0;
const TITLE_BOX_HEIGHT: f32 = 70.0;
const BORDER_GAP: f32 = 10.0;
const BORDER_RADIUS: f32 = 10.0;
const STAR_SIZE: f32 = 30.0;
const STAR_GAP: f32 = 40.0;
/// Padding inside a cell's inset box before any glyph is drawn.
const CELL_PADDING: f32 = 5.0;

const BORDER: Stroke = Stroke::new(Color::ORANGE, 3.0);
const TITLE_BOX: Stroke = Stroke::new(Color::TITLE_BOX, 2.0);
const INK: Stroke = Stroke::new(Color::BLACK, 1.0);

/// Column method: the second answer line sits 75 pt below the cell top, and the
/// answer sheet prints a 7-character result 30 pt into the padded cell.
const COLUMN_METHOD_MIN_CELL: (f32, f32) = (90.0, 80.0);
/// Long division: bracket plus a letter-spaced 3-digit dividend.
const LONG_DIVISION_MIN_CELL: (f32, f32) = (112.0, 60.0);

// ────────────────────────────────────────────────────────────────────────────
// Inputs and outputs
// ────────────────────────────────────────────────────────────────────────────

/// Fully resolved configuration for one drill document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillSpec {
    pub style: DrillStyle,
    pub operator: Operator,
    pub difficulty: Difficulty,
    pub digits_a: u8,
    pub digits_b: u8,
    pub rows: u32,
    pub columns: u32,
    /// Number of question pages. Answer pages are added as needed.
    pub pages: u32,
}

impl DrillSpec {
    /// Spec with the style's default grid, one page and the level's digit counts.
    pub fn new(style: DrillStyle, operator: Operator, difficulty: Difficulty) -> Self {
        let (rows, columns) = style.default_grid();
        let (digits_a, digits_b) = difficulty.digits();
        DrillSpec {
            style,
            operator,
            difficulty,
            digits_a,
            digits_b,
            rows,
            columns,
            pages: 1,
        }
    }

    pub fn total_questions(&self) -> u32 {
        self.rows * self.columns * self.pages
    }

    pub fn validate(&self) -> Result<(), DrillError> {
        digit_range(self.digits_a)?;
        digit_range(self.digits_b)?;
        if self.pages == 0 {
            return Err(DrillError::InvalidConfig(
                "a drill needs at least one question page".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tunables that come from service configuration rather than the request.
#[derive(Debug, Clone, Copy)]
pub struct WorksheetSettings {
    pub answer_rows_per_page: u32,
    pub max_sampling_attempts: u32,
}

/// A generated drill: drawing commands plus the data they were drawn from.
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub id: Uuid,
    pub commands: Vec<RenderCommand>,
    pub questions: QuestionSet,
    pub answers: Vec<AnswerEntry>,
    pub page_count: usize,
}

/// Smallest question cell, as `(width, height)`, that holds one question
/// without drawing into its neighbours.
pub fn min_cell_size(style: DrillStyle) -> (f32, f32) {
    match style {
        DrillStyle::ColumnMethod => COLUMN_METHOD_MIN_CELL,
        DrillStyle::LongDivision => LONG_DIVISION_MIN_CELL,
    }
}

fn check_cell_fits(grid: &GridConfig, style: DrillStyle) -> Result<(), DrillError> {
    let (min_width, min_height) = min_cell_size(style);
    if grid.column_width < min_width || grid.row_height < min_height {
        return Err(DrillError::InvalidConfig(format!(
            "a {}x{} grid gives {:.1}x{:.1} pt cells; {} questions need at least {}x{} pt",
            grid.rows,
            grid.columns,
            grid.column_width,
            grid.row_height,
            style.title(),
            min_width,
            min_height
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Generates the question pages and answer pages for `spec`.
///
/// Either the whole worksheet is produced or an error is returned; nothing
/// partial escapes.
pub fn generate_worksheet(
    spec: &DrillSpec,
    geometry: &PageGeometry,
    settings: &WorksheetSettings,
    assets: &dyn AssetLocator,
    source: &mut dyn NumberSource,
) -> Result<Worksheet, DrillError> {
    spec.validate()?;

    let question_grid = compute_grid(
        geometry.content_width(),
        geometry.content_height(),
        QUESTION_HEADER_HEIGHT,
        spec.rows,
        spec.columns,
    )?;
    check_cell_fits(&question_grid, spec.style)?;
    let answer_grid = compute_grid(
        geometry.content_width(),
        geometry.content_height(),
        ANSWER_HEADER_HEIGHT,
        settings.answer_rows_per_page,
        spec.columns,
    )?;

    let mut builder = WorksheetBuilder {
        spec,
        geometry,
        assets,
        canvas: Canvas::new(),
    };
    let mut generator = QuestionGenerator::new(spec.style, settings.max_sampling_attempts);
    debug!(
        "Generating {} questions ({} per page) for {:?}",
        question_grid.capacity() * spec.pages,
        question_grid.capacity(),
        spec.style
    );

    // Question pass: the only place questions are created.
    for page in 0..spec.pages {
        if page > 0 {
            builder.canvas.add_page();
        }
        builder.question_page_frame(source);
        for (row, column) in question_grid.cells() {
            let question =
                generator.next_question(source, spec.operator, spec.digits_a, spec.digits_b)?;
            let cell = cell_origin(
                &question_grid,
                geometry.origin_x(),
                builder.question_grid_top(),
                row,
                column,
            )?;
            builder.draw_question(&cell.inset(), &question);
        }
    }
    debug!(
        "Question pass done: {} questions, {:.2} draws per question",
        generator.questions().len(),
        generator.mean_attempts()
    );

    let questions = generator.into_questions();

    // Answer pass: replays the stored questions in generation order.
    builder.draw_answer_pages(&answer_grid, &questions)?;
    builder.stamp_page_numbers();

    let page_count = builder.canvas.page_count();
    let answers = answer_list(&questions);
    let worksheet = Worksheet {
        id: Uuid::new_v4(),
        commands: builder.canvas.into_commands(),
        questions,
        answers,
        page_count,
    };

    info!(
        drill_id = %worksheet.id,
        style = ?spec.style,
        operator = %spec.operator,
        questions = worksheet.questions.len(),
        pages = worksheet.page_count,
        "Worksheet generated"
    );
    Ok(worksheet)
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

struct WorksheetBuilder<'a> {
    spec: &'a DrillSpec,
    geometry: &'a PageGeometry,
    assets: &'a dyn AssetLocator,
    canvas: Canvas,
}

impl WorksheetBuilder<'_> {
    fn question_grid_top(&self) -> f32 {
        self.geometry.origin_y() + QUESTION_HEADER_HEIGHT
    }

    fn answer_grid_top(&self) -> f32 {
        self.geometry.origin_y() + ANSWER_HEADER_HEIGHT
    }

    // ── question pages ──────────────────────────────────────────────────────

    fn question_page_frame(&mut self, source: &mut dyn NumberSource) {
        self.header();
        self.title_band(source);
        let border_top = self.question_grid_top() - BORDER_GAP;
        self.border(border_top);
        self.stars();
    }

    /// Name and marks lines with their Malay captions.
    fn header(&mut self) {
        let (x, y) = (self.geometry.origin_x(), self.geometry.origin_y());
        let width = self.geometry.content_width();
        let caption = TextStyle::new(FontFace::Regular, 9.0).color(Color::GREY);

        self.canvas.text(
            "Name: ___________________________________",
            x,
            y,
            TextStyle::new(FontFace::Oblique, 14.0),
        );
        self.canvas.text("Nama:", x, y + 17.0, caption);

        let marks = format!("Marks: _______/{}", self.spec.total_questions());
        let marks_width = text_width(&marks, FontFace::Oblique, 14.0, 0.0);
        self.canvas.text(
            marks,
            x,
            y,
            TextStyle::new(FontFace::Oblique, 14.0).align(Align::Right, width),
        );
        let caption_x = x + width - marks_width;
        self.canvas.text("Markah:", caption_x, y + 17.0, caption);
    }

    /// Cartoon, title box and bilingual instructions.
    fn title_band(&mut self, source: &mut dyn NumberSource) {
        let x = self.geometry.origin_x();
        let y = self.geometry.origin_y() + TITLE_OFFSET;
        let width = self.geometry.content_width();
        let spec = self.spec;
        let symbol = spec.operator.symbol();

        if let Some(path) = self.assets.cartoon(spec.difficulty, source) {
            self.canvas.push(RenderCommand::Image {
                path,
                x,
                y: y - 5.0,
                width: None,
                height: Some(TITLE_BOX_HEIGHT + 10.0),
            });
        }

        let box_x = x + TITLE_IMAGE_WIDTH + 3.0 * TITLE_GAP;
        let box_width = width - TITLE_IMAGE_WIDTH - 3.0 * TITLE_GAP;
        self.canvas.push(RenderCommand::Rect {
            x: box_x,
            y,
            width: box_width,
            height: TITLE_BOX_HEIGHT,
            stroke: TITLE_BOX,
        });

        let title = format!(
            "Worksheet: {} Level ({} digits {} {} digit(s))",
            spec.difficulty.label_eng(),
            spec.digits_a,
            symbol,
            spec.digits_b
        );
        self.canvas.text(
            title,
            box_x,
            y + 12.0,
            TextStyle::new(FontFace::Bold, 12.0)
                .color(Color::TITLE_GREEN)
                .align(Align::Center, box_width),
        );
        let subtitle = format!(
            "Latihan: Tahap {} ({} digit {} {} digit)",
            spec.difficulty.label_malay(),
            spec.digits_a,
            symbol,
            spec.digits_b
        );
        self.canvas.text(
            subtitle,
            box_x,
            y + 35.0,
            TextStyle::new(FontFace::Regular, 11.0)
                .color(Color::GREY)
                .align(Align::Center, box_width),
        );

        self.canvas.text(
            format!(
                "Solve the following questions using the {} function.",
                spec.operator.name_eng()
            ),
            x,
            y + 85.0,
            TextStyle::new(FontFace::Oblique, 14.0).align(Align::Center, width),
        );
        self.canvas.text(
            format!(
                "Selesaikan soalan-soalan berikut dengan menggunakan fungsi {}.",
                spec.operator.name_malay()
            ),
            x,
            y + 100.5,
            TextStyle::new(FontFace::Regular, 10.0)
                .color(Color::GREY)
                .align(Align::Center, width),
        );
    }

    /// Orange rounded frame from `top` down to the bottom margin.
    fn border(&mut self, top: f32) {
        let g = self.geometry;
        self.canvas.push(RenderCommand::RoundedRect {
            x: g.origin_x() - CELL_PADDING,
            y: top,
            width: g.content_width() + 2.0 * CELL_PADDING,
            height: g.content_bottom() - top,
            radius: BORDER_RADIUS,
            stroke: BORDER,
        });
    }

    /// Three stars stacked in the right margin, above the bottom margin.
    fn stars(&mut self) {
        let g = self.geometry;
        let x = g.width - g.margin_right * 7.0 / 8.0;
        let base = g.content_bottom() - STAR_SIZE;
        for (slot, number) in [(3.0_f32, 8_u8), (2.0, 9), (1.0, 10)] {
            if let Some(path) = self.assets.star(number) {
                self.canvas.push(RenderCommand::Image {
                    path,
                    x,
                    y: base - STAR_GAP * slot,
                    width: Some(STAR_SIZE),
                    height: None,
                });
            }
        }
    }

    fn draw_question(&mut self, cell: &CellGeometry, question: &Question) {
        match self.spec.style {
            DrillStyle::ColumnMethod => self.column_method(cell, question),
            DrillStyle::LongDivision => self.long_division(cell, question),
        }
    }

    /// Operands stacked right-aligned, operator at the left, two answer lines.
    fn column_method(&mut self, cell: &CellGeometry, question: &Question) {
        let x = cell.origin_x + CELL_PADDING;
        let y = cell.origin_y + CELL_PADDING;
        let width = cell.width - 2.0 * CELL_PADDING;
        let body = TextStyle::new(FontFace::Regular, 12.0);

        let label = format!("{})", question.index);
        self.canvas.text(label, x, y, body);
        self.canvas.text(
            question.operand_a.to_string(),
            x,
            y + 15.0,
            body.align(Align::Right, width),
        );
        let symbol = question.operator.symbol();
        self.canvas.text(symbol, x + 20.0, y + 30.0, body);
        self.canvas.text(
            question.operand_b.to_string(),
            x,
            y + 30.0,
            body.align(Align::Right, width),
        );
        let (left, right) = (x + 20.0, x + width);
        self.canvas.line((left, y + 50.0), (right, y + 50.0), INK);
        self.canvas.line((left, y + 70.0), (right, y + 70.0), INK);
    }

    /// Divisor, then a bracket with a curved left side, then the dividend under the bar.
    fn long_division(&mut self, cell: &CellGeometry, question: &Question) {
        const DIVISOR_WIDTH: f32 = 36.0;
        const BRACKET_X: f32 = 40.0;
        const DIVIDEND_X: f32 = 48.0;
        const SPACING: f32 = 6.0;

        let x = cell.origin_x + CELL_PADDING;
        let y = cell.origin_y + CELL_PADDING;
        let width = cell.width - 2.0 * CELL_PADDING;
        let digits = TextStyle::new(FontFace::Regular, 14.0);

        let label = format!("{})", question.index);
        self.canvas.text(label, x, y, digits);
        self.canvas.text(
            question.operand_b.to_string(),
            x,
            y + 25.0,
            digits.align(Align::Right, DIVISOR_WIDTH),
        );

        let dividend = question.operand_a.to_string();
        let dividend_width = text_width(&dividend, FontFace::Regular, 14.0, SPACING);
        let bar_end = (DIVIDEND_X + dividend_width + 2.0).min(width);
        self.canvas.push(RenderCommand::Path {
            start: (x + bar_end, y + 20.0),
            segments: vec![
                PathSegment::LineTo {
                    x: x + BRACKET_X,
                    y: y + 20.0,
                },
                PathSegment::QuadTo {
                    cx: x + DIVIDEND_X,
                    cy: y + 32.5,
                    x: x + BRACKET_X,
                    y: y + 45.0,
                },
            ],
            stroke: INK,
        });
        self.canvas.text(
            dividend,
            x + DIVIDEND_X,
            y + 25.0,
            digits.letter_spacing(SPACING),
        );
    }

    // ── answer pages ────────────────────────────────────────────────────────

    fn answer_page_frame(&mut self) {
        let (x, y) = (self.geometry.origin_x(), self.geometry.origin_y());
        self.canvas.text(
            "Answer Sheet",
            x,
            y,
            TextStyle::new(FontFace::Bold, 14.0).color(Color::HEADING_PURPLE),
        );
        self.canvas.text(
            "Kertas Jawapan",
            x,
            y + 17.0,
            TextStyle::new(FontFace::Regular, 9.0).color(Color::GREY),
        );
        let border_top = self.answer_grid_top() - BORDER_GAP;
        self.border(border_top);
    }

    fn draw_answer_pages(
        &mut self,
        grid: &GridConfig,
        questions: &QuestionSet,
    ) -> Result<(), DrillError> {
        let total = questions.len();
        let mut paginator = AnswerPaginator::new(grid.rows, grid.columns);

        self.canvas.add_page();
        self.answer_page_frame();

        for (position, question) in questions.iter().enumerate() {
            let (row, column) = paginator.next_slot();
            let cell = cell_origin(
                grid,
                self.geometry.origin_x(),
                self.answer_grid_top(),
                row,
                column,
            )?
            .inset();
            self.print_answer(&cell, question);

            if paginator.record(total - position - 1) {
                self.canvas.add_page();
                self.answer_page_frame();
            }
        }
        debug_assert_eq!(paginator.pages(), answer_page_count(total, paginator.capacity()));
        debug!(
            "Answer pass done: {} pages at {} answers per page",
            paginator.pages(),
            paginator.capacity()
        );
        Ok(())
    }

    fn print_answer(&mut self, cell: &CellGeometry, question: &Question) {
        let x = cell.origin_x + CELL_PADDING;
        let y = cell.origin_y + CELL_PADDING;
        let style = TextStyle::new(FontFace::Regular, 11.0);
        let label = format!("{})", question.index);
        let answer = format_answer(compute_answer(question));
        self.canvas.text(label, x, y, style);
        self.canvas.text(answer, x + 30.0, y, style);
    }

    fn stamp_page_numbers(&mut self) {
        let x = self.geometry.origin_x();
        let y = self.geometry.margin_top / 2.0;
        let width = self.geometry.content_width();
        self.canvas.stamp_pages(|page, total| {
            vec![RenderCommand::Text {
                text: format!("p. {page}/{total}"),
                x,
                y,
                style: TextStyle::new(FontFace::Regular, 9.0)
                    .color(Color::GREY)
                    .align(Align::Right, width),
            }]
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::question::RngSource;
    use crate::render::assets::NoAssets;
    use crate::render::commands::split_pages;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn settings() -> WorksheetSettings {
        WorksheetSettings {
            answer_rows_per_page: 12,
            max_sampling_attempts: 10_000,
        }
    }

    fn generate(spec: &DrillSpec, seed: u64) -> Result<Worksheet, DrillError> {
        let mut source = RngSource(StdRng::seed_from_u64(seed));
        generate_worksheet(spec, &PageGeometry::a4(), &settings(), &NoAssets, &mut source)
    }

    fn texts(page: &[RenderCommand]) -> Vec<&str> {
        page.iter()
            .filter_map(|c| match c {
                RenderCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Pairs every "n)" label on a page with the text drawn right after it.
    fn labelled(page: &[RenderCommand]) -> Vec<(u32, String)> {
        let texts = texts(page);
        texts
            .windows(2)
            .filter_map(|w| {
                let index = w[0].strip_suffix(')')?.parse::<u32>().ok()?;
                Some((index, w[1].to_string()))
            })
            .collect()
    }

    struct FixedAssets;

    impl AssetLocator for FixedAssets {
        fn cartoon(&self, _: Difficulty, _: &mut dyn NumberSource) -> Option<PathBuf> {
            Some(PathBuf::from("animals/easy/cat.png"))
        }

        fn star(&self, number: u8) -> Option<PathBuf> {
            Some(PathBuf::from(format!("stars/star-{number}.png")))
        }
    }

    // ── scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn test_five_by_five_three_digit_addition() {
        let mut spec = DrillSpec::new(DrillStyle::ColumnMethod, Operator::Add, Difficulty::Easy);
        spec.digits_a = 3;
        spec.digits_b = 3;

        let worksheet = generate(&spec, 1).unwrap();
        assert_eq!(worksheet.questions.len(), 25);
        let indices: Vec<u32> = worksheet.questions.iter().map(|q| q.index).collect();
        assert_eq!(indices, (1..=25).collect::<Vec<_>>());

        let first = worksheet.questions.get(1).unwrap();
        assert_eq!(worksheet.answers[0].index, 1);
        assert_eq!(worksheet.answers[0].answer, first.operand_a + first.operand_b);
        // One question page and one answer page.
        assert_eq!(worksheet.page_count, 2);
    }

    #[test]
    fn test_questions_drawn_in_row_major_order() {
        let spec = DrillSpec::new(DrillStyle::ColumnMethod, Operator::Subtract, Difficulty::Medium);
        let worksheet = generate(&spec, 8).unwrap();
        let pages = split_pages(&worksheet.commands);

        let positions: Vec<(u32, f32, f32)> = pages[0]
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Text { text, x, y, .. } => {
                    let index = text.strip_suffix(')')?.parse::<u32>().ok()?;
                    Some((index, *x, *y))
                }
                _ => None,
            })
            .collect();
        assert_eq!(positions.len(), 25);
        for pair in positions.windows(2) {
            let ((a, ax, ay), (b, bx, by)) = (pair[0], pair[1]);
            assert_eq!(b, a + 1);
            // Next cell is either to the right on the same row or on a lower row.
            assert!((by == ay && bx > ax) || by > ay);
        }
    }

    #[test]
    fn test_answer_pass_replays_question_pass() {
        let spec = DrillSpec::new(DrillStyle::ColumnMethod, Operator::Multiply, Difficulty::Hard);
        let worksheet = generate(&spec, 21).unwrap();
        let pages = split_pages(&worksheet.commands);

        // Question page: label is followed by operand A.
        let printed_questions = labelled(pages[0]);
        assert_eq!(printed_questions.len(), 25);
        for (index, operand_a) in &printed_questions {
            let q = worksheet.questions.get(*index).unwrap();
            assert_eq!(operand_a, &q.operand_a.to_string());
        }

        // Answer page: label is followed by the formatted result of the same question.
        let printed_answers = labelled(pages[1]);
        assert_eq!(printed_answers.len(), 25);
        for (index, answer) in &printed_answers {
            let q = worksheet.questions.get(*index).unwrap();
            assert_eq!(answer, &format_answer(compute_answer(q)));
        }
    }

    #[test]
    fn test_long_division_answers_paginate_at_48() {
        let mut spec = DrillSpec::new(DrillStyle::LongDivision, Operator::Divide, Difficulty::Medium);
        spec.pages = 7; // 7 × 16 = 112 questions

        let worksheet = generate(&spec, 3).unwrap();
        assert_eq!(worksheet.questions.len(), 112);
        for q in &worksheet.questions {
            assert!(q.operand_b >= 2);
            assert_eq!(q.operand_a % q.operand_b, 0);
        }

        // 7 question pages + ceil(112 / 48) = 3 answer pages.
        assert_eq!(worksheet.page_count, 10);
        let pages = split_pages(&worksheet.commands);
        assert_eq!(pages.len(), 10);

        let per_answer_page: Vec<usize> = pages[7..].iter().map(|p| labelled(p).len()).collect();
        assert_eq!(per_answer_page, vec![48, 48, 16]);
        assert!(texts(pages[9]).contains(&"p. 10/10"));
    }

    #[test]
    fn test_question_index_continues_across_pages() {
        let mut spec = DrillSpec::new(DrillStyle::LongDivision, Operator::Divide, Difficulty::Easy);
        spec.pages = 2;
        let worksheet = generate(&spec, 5).unwrap();
        let pages = split_pages(&worksheet.commands);
        let second_page: Vec<u32> = labelled(pages[1]).iter().map(|(i, _)| *i).collect();
        assert_eq!(second_page, (17..=32).collect::<Vec<_>>());
    }

    // ── failures ────────────────────────────────────────────────────────────

    #[test]
    fn test_unreachable_division_fails_without_output() {
        let mut spec = DrillSpec::new(DrillStyle::LongDivision, Operator::Divide, Difficulty::Easy);
        spec.digits_a = 1;
        spec.digits_b = 2;
        let mut source = RngSource(StdRng::seed_from_u64(1));
        let settings = WorksheetSettings {
            answer_rows_per_page: 12,
            max_sampling_attempts: 200,
        };
        let result =
            generate_worksheet(&spec, &PageGeometry::a4(), &settings, &NoAssets, &mut source);
        assert!(matches!(result, Err(DrillError::GenerationExhausted { .. })));
    }

    #[test]
    fn test_invalid_spec_rejected() {
        let mut spec = DrillSpec::new(DrillStyle::ColumnMethod, Operator::Add, Difficulty::Easy);
        spec.digits_a = 4;
        assert_eq!(generate(&spec, 1).unwrap_err(), DrillError::InvalidDigitCount(4));

        let mut spec = DrillSpec::new(DrillStyle::ColumnMethod, Operator::Add, Difficulty::Easy);
        spec.rows = 0;
        assert!(matches!(generate(&spec, 1), Err(DrillError::InvalidConfig(_))));

        let mut spec = DrillSpec::new(DrillStyle::ColumnMethod, Operator::Add, Difficulty::Easy);
        spec.pages = 0;
        assert!(matches!(generate(&spec, 1), Err(DrillError::InvalidConfig(_))));
    }

    #[test]
    fn test_grid_too_dense_for_its_style_rejected() {
        let mut spec = DrillSpec::new(DrillStyle::ColumnMethod, Operator::Add, Difficulty::Easy);
        spec.rows = 8;
        assert!(matches!(generate(&spec, 1), Err(DrillError::InvalidConfig(_))));

        let mut spec = DrillSpec::new(DrillStyle::ColumnMethod, Operator::Add, Difficulty::Easy);
        spec.columns = 10;
        assert!(matches!(generate(&spec, 1), Err(DrillError::InvalidConfig(_))));

        let mut spec = DrillSpec::new(DrillStyle::LongDivision, Operator::Divide, Difficulty::Easy);
        spec.columns = 5;
        assert!(matches!(generate(&spec, 1), Err(DrillError::InvalidConfig(_))));
    }

    #[test]
    fn test_densest_column_grid_keeps_rows_apart() {
        let mut spec =
            DrillSpec::new(DrillStyle::ColumnMethod, Operator::Multiply, Difficulty::Hard);
        spec.rows = 7;
        let geometry = PageGeometry::a4();
        let grid = compute_grid(
            geometry.content_width(),
            geometry.content_height(),
            QUESTION_HEADER_HEIGHT,
            spec.rows,
            spec.columns,
        )
        .unwrap();
        let (min_width, min_height) = min_cell_size(spec.style);
        assert!(grid.row_height >= min_height && grid.column_width >= min_width);

        let worksheet = generate(&spec, 13).unwrap();
        let pages = split_pages(&worksheet.commands);
        let line_ys: Vec<f32> = pages[0]
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Line { from, .. } => Some(from.1),
                _ => None,
            })
            .collect();
        // Two answer lines per question, drawn in question order.
        assert_eq!(line_ys.len(), 2 * 35);

        let grid_top = geometry.origin_y() + QUESTION_HEADER_HEIGHT;
        for (k, pair) in line_ys.chunks(2).enumerate() {
            let row = (k as u32 / spec.columns) as f32;
            let next_row_top = grid_top + (row + 1.0) * grid.row_height;
            assert!(pair[1] < next_row_top, "question {} spills into the next row", k + 1);
        }
    }

    // ── decoration ──────────────────────────────────────────────────────────

    #[test]
    fn test_images_requested_per_question_page() {
        let mut spec = DrillSpec::new(DrillStyle::LongDivision, Operator::Divide, Difficulty::Easy);
        spec.pages = 2;
        let mut source = RngSource(StdRng::seed_from_u64(4));
        let worksheet =
            generate_worksheet(&spec, &PageGeometry::a4(), &settings(), &FixedAssets, &mut source)
                .unwrap();
        let images = worksheet
            .commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Image { .. }))
            .count();
        // One cartoon and three stars on each question page, none on the answer page.
        assert_eq!(images, 8);
    }

    #[test]
    fn test_header_shows_total_marks() {
        let mut spec = DrillSpec::new(DrillStyle::LongDivision, Operator::Divide, Difficulty::Hard);
        spec.pages = 3;
        let worksheet = generate(&spec, 9).unwrap();
        let pages = split_pages(&worksheet.commands);
        assert!(texts(pages[0]).contains(&"Marks: _______/48"));
        assert!(texts(pages[0]).contains(&"Worksheet: Hard Level (3 digits ÷ 2 digit(s))"));
    }
}
