use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph,
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points, Rectangle},
    },
};

use super::interpolate::{
    CELL_SIZE, HeadAngleFilter, Point, PointStabilizer, bite_path, cell_center,
    collapse_bite_path, head_angle, render_points, smooth_step,
};
use crate::game::Phase;
use crate::session::FrameSnapshot;

const BACKGROUND: Color = Color::Rgb(0x2b, 0x3d, 0x1c);
const GRASS_DOT: Color = Color::Rgb(0x4d, 0x6b, 0x2c);
const BODY_EDGE: Color = Color::Rgb(0x13, 0x3b, 0x9a);
const BODY_MID: Color = Color::Rgb(0x2c, 0x66, 0xdd);
const BELLY: Color = Color::Rgb(0x7d, 0xa8, 0xff);
const HEAD: Color = Color::Rgb(0x1d, 0x4c, 0xc2);
const EYE: Color = Color::Rgb(0xff, 0xff, 0xff);
const APPLE: Color = Color::Rgb(0xf4, 0x6a, 0x37);
const LEAF: Color = Color::Rgb(0x56, 0xc6, 0x45);
const FLASH: (u8, u8, u8) = (0xef, 0x44, 0x44);

/// Body half-width in curve units before tapering
const BODY_HALF_WIDTH: f64 = CELL_SIZE * 0.22;

/// Shapes for one frame, in canvas coordinates (y up)
struct Scene {
    body: Vec<(f64, f64)>,
    offsets: Vec<(f64, f64)>,
    tail_tip: Option<((f64, f64), (f64, f64))>,
    head: Option<(f64, f64)>,
    eyes: Vec<(f64, f64)>,
    food: (f64, f64),
    food_radius: f64,
    bite: Option<(Vec<(f64, f64)>, Color)>,
    flash: Option<Color>,
}

/// Draws a [`FrameSnapshot`]. The only state kept between frames is the
/// smoothing of the body curve and head heading.
pub struct Renderer {
    stabilizer: PointStabilizer,
    head_filter: HeadAngleFilter,
    round: Option<u32>,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            stabilizer: PointStabilizer::new(),
            head_filter: HeadAngleFilter::default(),
            round: None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, snapshot: &FrameSnapshot) {
        if self.round != Some(snapshot.round) {
            self.stabilizer.reset();
            self.head_filter.reset();
            self.round = Some(snapshot.round);
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(4), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(snapshot);
        frame.render_widget(stats, chunks[0]);

        let board = board_area(chunks[1], snapshot.grid_width, snapshot.grid_height);
        let scene = self.build_scene(snapshot);
        frame.render_widget(
            Self::render_board(snapshot.grid_width, snapshot.grid_height, &scene),
            board,
        );

        match snapshot.phase {
            Phase::NotStarted => {
                let popup = centered(board, 40, 7);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_start(snapshot), popup);
            }
            Phase::Over => {
                let popup = centered(board, 44, 9);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_game_over(snapshot), popup);
            }
            Phase::AwaitingFirstInput | Phase::Running => {}
        }

        let footer = self.render_footer(snapshot);
        frame.render_widget(footer, chunks[2]);
    }

    fn build_scene(&mut self, snapshot: &FrameSnapshot) -> Scene {
        let height = snapshot.grid_height as f64 * CELL_SIZE;
        let flip = |p: Point| (p.x, height - p.y);

        let target = render_points(snapshot.snake, snapshot.previous_snake, snapshot.alpha);
        let points = self.stabilizer.stabilize(&target).to_vec();

        let body: Vec<(f64, f64)> = points.iter().map(|p| flip(*p)).collect();
        let offsets = body_outline(&points).into_iter().map(flip).collect();

        let tail_tip = match points.as_slice() {
            [.., prev, tip] => {
                let angle = (tip.y - prev.y).atan2(tip.x - prev.x);
                let len = CELL_SIZE * 0.6;
                let end = Point::new(tip.x + angle.cos() * len, tip.y + angle.sin() * len);
                Some((flip(*tip), flip(end)))
            }
            _ => None,
        };

        let angle = head_angle(&points).unwrap_or_else(|| snapshot.direction.angle());
        let angle = self.head_filter.update(angle);
        let (head, eyes) = match points.first() {
            Some(head) => {
                let side = CELL_SIZE * 0.15;
                let ahead = CELL_SIZE * 0.12;
                let (sin, cos) = angle.sin_cos();
                let eyes = [-1.0, 1.0]
                    .iter()
                    .map(|s| {
                        flip(Point::new(
                            head.x + cos * ahead - sin * side * s,
                            head.y + sin * ahead + cos * side * s,
                        ))
                    })
                    .collect();
                (Some(flip(*head)), eyes)
            }
            None => (None, Vec::new()),
        };

        // bob and pulse the apple a little
        let t = snapshot.now_ms * 0.0045;
        let food_center = cell_center(snapshot.food);
        let food = flip(Point::new(food_center.x, food_center.y + t.sin() * 1.4));
        let food_radius = CELL_SIZE * 0.3 * (0.97 + 0.06 * (t * 1.18).sin());

        let bite = snapshot.effects.self_bite.and_then(|effect| {
            let path = bite_path(effect.payload.cell, &effect.payload.removed);
            if path.len() < 2 {
                return None;
            }
            let progress = effect.progress(snapshot.now_ms);
            let collapsed = collapse_bite_path(&path, path[0], progress);
            let fade = 1.0 - smooth_step(progress) * 0.9;
            Some((
                collapsed.into_iter().map(flip).collect(),
                fade_toward_background((0x5f, 0x94, 0xf2), fade),
            ))
        });

        let flash = snapshot
            .effects
            .wall_flash
            .map(|effect| fade_toward_background(FLASH, effect.remaining(snapshot.now_ms)));

        Scene {
            body,
            offsets,
            tail_tip,
            head,
            eyes,
            food,
            food_radius,
            bite,
            flash,
        }
    }

    fn render_board(
        grid_width: usize,
        grid_height: usize,
        scene: &Scene,
    ) -> Canvas<'_, impl Fn(&mut Context) + '_> {
        let width = grid_width as f64 * CELL_SIZE;
        let height = grid_height as f64 * CELL_SIZE;
        let grass: Vec<(f64, f64)> = (0..grid_height)
            .flat_map(|row| {
                (0..grid_width)
                    .filter(move |col| (row + col) % 2 == 0)
                    .map(move |col| {
                        (
                            (col as f64 + 0.5) * CELL_SIZE,
                            height - (row as f64 + 0.5) * CELL_SIZE,
                        )
                    })
            })
            .collect();

        let border = match scene.flash {
            Some(color) => Style::default().fg(color).add_modifier(Modifier::BOLD),
            None => Style::default().fg(Color::White),
        };

        Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(border)
                    .title(" Snake "),
            )
            .marker(Marker::Braille)
            .background_color(BACKGROUND)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(move |ctx| {
                ctx.draw(&Points {
                    coords: &grass,
                    color: GRASS_DOT,
                });
                ctx.layer();

                ctx.draw(&Circle {
                    x: scene.food.0,
                    y: scene.food.1,
                    radius: scene.food_radius,
                    color: APPLE,
                });
                ctx.draw(&CanvasLine::new(
                    scene.food.0,
                    scene.food.1 + scene.food_radius,
                    scene.food.0 + CELL_SIZE * 0.15,
                    scene.food.1 + scene.food_radius + CELL_SIZE * 0.12,
                    LEAF,
                ));
                ctx.layer();

                if let Some((path, color)) = &scene.bite {
                    draw_polyline(ctx, path, *color);
                }

                for pair in scene.offsets.chunks(2) {
                    if let [a, b] = pair {
                        ctx.draw(&CanvasLine::new(a.0, a.1, b.0, b.1, BODY_EDGE));
                    }
                }
                draw_polyline(ctx, &scene.body, BODY_MID);
                if let Some((tip, end)) = scene.tail_tip {
                    ctx.draw(&CanvasLine::new(tip.0, tip.1, end.0, end.1, BODY_EDGE));
                }
                ctx.layer();

                if let Some((x, y)) = scene.head {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: CELL_SIZE * 0.39,
                        color: HEAD,
                    });
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: CELL_SIZE * 0.2,
                        color: BELLY,
                    });
                    ctx.draw(&Points {
                        coords: &scene.eyes,
                        color: EYE,
                    });
                }

                if let Some(color) = scene.flash {
                    ctx.draw(&Rectangle {
                        x: 0.0,
                        y: 0.0,
                        width,
                        height,
                        color,
                    });
                }
            })
    }

    fn render_stats(&self, snapshot: &FrameSnapshot) -> Paragraph<'_> {
        let metrics = snapshot.metrics;
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);
        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                snapshot.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Apples: ", label),
            Span::styled(snapshot.apples.to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(snapshot.difficulty.label(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.format_best(), value),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn render_start(&self, snapshot: &FrameSnapshot) -> Paragraph<'_> {
        let key = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);
        let text = vec![
            Line::from(Span::styled(
                "SNAKE",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled("Space", key),
                Span::styled(" to play", Style::default().fg(Color::Gray)),
            ]),
            Line::from(vec![
                Span::styled("Speed: ", Style::default().fg(Color::Yellow)),
                Span::styled(snapshot.difficulty.label(), key),
                Span::styled(" (1/2/3)", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
    }

    fn render_game_over(&self, snapshot: &FrameSnapshot) -> Paragraph<'_> {
        let metrics = snapshot.metrics;
        let text = vec![
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snapshot.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("   Apples: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snapshot.apples.to_string(),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(vec![
                Span::styled("Games: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    metrics.games_played.to_string(),
                    Style::default().fg(Color::White),
                ),
            ]),
            if metrics.new_record {
                Line::from(Span::styled(
                    "New record!",
                    Style::default()
                        .fg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled("Best: ", Style::default().fg(Color::Gray)),
                    Span::styled(metrics.format_best(), Style::default().fg(Color::White)),
                ])
            },
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_footer<'a>(&self, snapshot: &FrameSnapshot<'a>) -> Paragraph<'a> {
        let text = vec![
            Line::from(Span::styled(
                snapshot.status,
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" / drag to move | "),
                Span::styled("1 2 3", Style::default().fg(Color::Cyan)),
                Span::raw(" speed | "),
                Span::styled("R", Style::default().fg(Color::Green)),
                Span::raw(" restart | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" quit"),
            ]),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_polyline(ctx: &mut Context, points: &[(f64, f64)], color: Color) {
    for pair in points.windows(2) {
        ctx.draw(&CanvasLine::new(
            pair[0].0, pair[0].1, pair[1].0, pair[1].1, color,
        ));
    }
}

/// Pairs of points tracing both flanks of the body, tapering towards the
/// tail. Consecutive pairs form one flank segment each.
fn body_outline(points: &[Point]) -> Vec<Point> {
    if points.len() < 2 {
        return Vec::new();
    }
    let taper_start = ((points.len() as f64 * 0.62) as usize).max(1);
    let taper_len = (points.len() - taper_start).max(1) as f64;

    let flank = |i: usize, side: f64| {
        let prev = points[i.saturating_sub(1)];
        let next = points[(i + 1).min(points.len() - 1)];
        let (tx, ty) = (next.x - prev.x, next.y - prev.y);
        let len = tx.hypot(ty).max(f64::EPSILON);
        let taper = if i >= taper_start {
            1.0 - (i - taper_start) as f64 / taper_len * 0.6
        } else {
            1.0
        };
        let half = BODY_HALF_WIDTH * taper * side;
        Point::new(points[i].x - ty / len * half, points[i].y + tx / len * half)
    };

    let mut outline = Vec::with_capacity(points.len() * 4);
    for i in 0..points.len() - 1 {
        for side in [-1.0, 1.0] {
            outline.push(flank(i, side));
            outline.push(flank(i + 1, side));
        }
    }
    outline
}

/// Blend an RGB color towards the board background; `strength` 1 is the
/// color itself, 0 is background.
fn fade_toward_background(rgb: (u8, u8, u8), strength: f64) -> Color {
    let Color::Rgb(br, bg, bb) = BACKGROUND else {
        return Color::Rgb(rgb.0, rgb.1, rgb.2);
    };
    let s = strength.clamp(0.0, 1.0);
    let mix = |c: u8, b: u8| (f64::from(b) + (f64::from(c) - f64::from(b)) * s).round() as u8;
    Color::Rgb(mix(rgb.0, br), mix(rgb.1, bg), mix(rgb.2, bb))
}

/// Board rect: two terminal columns per grid column plus borders, centered
fn board_area(area: Rect, grid_width: usize, grid_height: usize) -> Rect {
    let width = ((grid_width * 2 + 2) as u16).min(area.width);
    let height = ((grid_height + 2) as u16).min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
