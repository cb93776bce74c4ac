// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use reservoir_engine::Block;

#[allow(dead_code)]
pub fn generate_exam_paper(sections: usize, questions_per_section: usize) -> Vec<Block> {
    const SECTION_NAMES: &[&str] = &["常识判断", "言语理解与表达", "数量关系", "判断推理", "资料分析"];

    let mut blocks = Vec::new();
    let mut number = 1;
    for section in 0..sections {
        let name = SECTION_NAMES[section % SECTION_NAMES.len()];
        blocks.push(Block::paragraph(format!("第{}部分 {name}", chinese_numeral(section + 1))));
        if section % SECTION_NAMES.len() == 4 {
            blocks.push(Block::paragraph("根据以下资料，回答下列问题"));
            blocks.push(Block::paragraph("2023年全年粮食产量比上年增长1.3%。"));
        }
        for _ in 0..questions_per_section {
            blocks.extend(generate_question(number));
            number += 1;
        }
    }
    blocks
}

#[allow(dead_code)]
pub fn generate_question(number: usize) -> Vec<Block> {
    vec![
        Block::paragraph(format!("{number}. 下列关于本题的说法，正确的是：")),
        Block::paragraph("A. 第一个选项"),
        Block::paragraph("B. 第二个选项"),
        Block::paragraph("C. 第三个选项"),
        Block::paragraph("D. 第四个选项【答案】B"),
        Block::paragraph("【解析】第一步，分析题干。第二步，逐项排除。"),
    ]
}

#[allow(dead_code)]
fn chinese_numeral(n: usize) -> &'static str {
    ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"][(n - 1) % 10]
}
