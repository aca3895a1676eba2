//! Terminal rendering of published generations.

use valence_world::{Generation, Particle};

/// Column and row of each shell slot inside a cell's 3x3 block, walking
/// the ring clockwise from the top-left corner.
const RING: [(usize, usize); 8] = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)];

const FILLED: char = 'o';
const UNFILLED: char = '.';

pub struct TerminalRenderer {
    electron_spin: bool,
    draw_count: usize,
}

impl TerminalRenderer {
    pub fn new(electron_spin: bool) -> Self {
        Self {
            electron_spin,
            draw_count: 0,
        }
    }

    /// Render one frame; each cell becomes a 3x3 block of characters
    pub fn draw(&mut self, generation: &Generation) -> String {
        let offset = if self.electron_spin { self.draw_count % 8 } else { 0 };
        self.draw_count += 1;

        let grid = &generation.grid;
        let size = grid.size();
        let mut canvas = vec![vec![' '; size * 3]; size * 3];
        grid.for_each_cell(|y, x, particle| {
            if particle.is_empty() {
                return;
            }
            let block = cell_block(particle, offset);
            for (row, line) in block.iter().enumerate() {
                for (col, ch) in line.iter().enumerate() {
                    canvas[y * 3 + row][x * 3 + col] = *ch;
                }
            }
        });

        let mut frame = format!(
            "generation {} | atoms {} | moves {} | swaps {} | blocked {}\n",
            generation.number,
            generation.stats.particles,
            generation.stats.moves,
            generation.stats.swaps,
            generation.stats.blocked
        );
        for line in canvas {
            frame.extend(line);
            frame.push('\n');
        }
        frame
    }
}

fn nucleus_glyph(particle: &Particle) -> char {
    if particle.protons() > 0 {
        std::char::from_digit(particle.protons() % 36, 36).unwrap_or('#')
    } else if particle.neutrons() > 0 {
        'n'
    } else {
        ' '
    }
}

fn cell_block(particle: &Particle, offset: usize) -> [[char; 3]; 3] {
    let mut block = [[' '; 3]; 3];
    block[1][1] = nucleus_glyph(particle);
    let valence = particle.valence();
    for (i, &(col, row)) in RING.iter().enumerate() {
        block[row][col] = if valence[(i + offset) % 8] {
            FILLED
        } else {
            UNFILLED
        };
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use valence_core::{Nucleons, Position};
    use valence_world::{Grid, TickStats};

    fn generation_with(particle: Particle) -> Generation {
        let mut grid = Grid::new(2);
        grid.set(Position::new(1, 0), particle);
        Generation {
            number: 3,
            grid,
            stats: TickStats {
                generation: 3,
                particles: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_cell_block_layout() {
        let atom = Particle::with_valence_start(Nucleons::uniform(3), 0);
        // filled slots 1, 4 and 7: top, bottom-right and left
        let block = cell_block(&atom, 0);
        assert_eq!(block[0], ['.', 'o', '.']);
        assert_eq!(block[1], ['o', '3', '.']);
        assert_eq!(block[2], ['.', '.', 'o']);
    }

    #[test]
    fn test_frame_dimensions() {
        let mut renderer = TerminalRenderer::new(false);
        let atom = Particle::with_valence_start(Nucleons::uniform(8), 0);
        let frame = renderer.draw(&generation_with(atom));
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "generation 3 | atoms 1 | moves 0 | swaps 0 | blocked 0");
        assert_eq!(lines[1], "   ooo");
        assert_eq!(lines[2], "   o8o");
        assert_eq!(lines[3], "   ooo");
        assert_eq!(lines[4].trim(), "");
    }

    #[test]
    fn test_electron_spin_rotates_ring() {
        let atom = Particle::with_valence_start(Nucleons::uniform(1), 0);
        let generation = generation_with(atom);

        let mut still = TerminalRenderer::new(false);
        assert_eq!(still.draw(&generation), still.draw(&generation));

        let mut spinning = TerminalRenderer::new(true);
        let first = spinning.draw(&generation);
        let second = spinning.draw(&generation);
        assert_ne!(first, second);
    }
}
