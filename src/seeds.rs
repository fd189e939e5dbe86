//! Built-in content: the reference questionnaire, crisis phrases and resources,
//! tier recommendations and the counselor persona. Everything here can be
//! overridden from the TOML config; these are the defaults the service ships with.

use std::collections::HashMap;

use crate::domain::{AnswerOption, Category, Question, QuestionCatalog, QuestionKind, RiskTier};

const FREQUENCY: [&str; 4] = ["Tidak pernah", "Kadang-kadang", "Sering", "Hampir selalu"];
const SEVERITY: [&str; 4] = ["Tidak pernah", "Masalah kecil", "Masalah sedang", "Masalah serius"];

fn question(id: &str, text: &str, labels: [&str; 4]) -> Question {
  Question {
    id: id.into(),
    text: text.into(),
    kind: QuestionKind::Radio,
    options: labels
      .iter()
      .enumerate()
      .map(|(i, label)| AnswerOption { value: i as i64, label: (*label).into() })
      .collect(),
  }
}

/// The ten-question gambling screening questionnaire, values 0..=3.
pub fn reference_catalog() -> QuestionCatalog {
  QuestionCatalog::new(vec![
    Category {
      name: "Perilaku Judi".into(),
      questions: vec![
        question(
          "q1",
          "Seberapa sering Anda berjudi online dalam 12 bulan terakhir?",
          [
            "Tidak pernah",
            "Kadang-kadang (1-2 kali per bulan)",
            "Sering (1-2 kali per minggu)",
            "Sangat sering (hampir setiap hari)",
          ],
        ),
        question("q2", "Apakah Anda pernah bertaruh lebih banyak uang dari yang Anda rencanakan?", FREQUENCY),
        question(
          "q3",
          "Apakah Anda pernah merasa perlu bertaruh dengan jumlah uang yang semakin besar untuk merasakan sensasi yang sama?",
          FREQUENCY,
        ),
      ],
    },
    Category {
      name: "Kontrol Diri".into(),
      questions: vec![
        question(
          "q4",
          "Seberapa sering Anda mencoba mengurangi atau berhenti berjudi tetapi tidak berhasil?",
          [
            "Tidak pernah mencoba",
            "Pernah mencoba 1-2 kali",
            "Sering mencoba tapi sulit",
            "Selalu gagal meskipun berusaha keras",
          ],
        ),
        question(
          "q5",
          "Apakah Anda merasa gelisah atau mudah marah ketika mencoba mengurangi atau berhenti berjudi?",
          FREQUENCY,
        ),
        question(
          "q6",
          "Apakah Anda berjudi sebagai cara untuk melarikan diri dari masalah atau untuk mengatasi perasaan sedih, cemas, atau bersalah?",
          FREQUENCY,
        ),
      ],
    },
    Category {
      name: "Dampak Sosial & Keuangan".into(),
      questions: vec![
        question(
          "q7",
          "Apakah Anda pernah kembali berjudi untuk mencoba memenangkan kembali uang yang telah hilang?",
          FREQUENCY,
        ),
        question(
          "q8",
          "Apakah Anda pernah berbohong kepada keluarga atau orang lain tentang aktivitas judi Anda?",
          FREQUENCY,
        ),
        question("q9", "Apakah kebiasaan judi Anda pernah menyebabkan masalah keuangan yang serius?", SEVERITY),
        question(
          "q10",
          "Apakah kebiasaan judi Anda pernah menyebabkan masalah dalam hubungan, pekerjaan, atau pendidikan?",
          SEVERITY,
        ),
      ],
    },
  ])
}

pub fn crisis_phrases() -> Vec<String> {
  [
    "bunuh diri",
    "suicide",
    "mengakhiri hidup",
    "tidak ingin hidup lagi",
    "mati saja",
    "lebih baik mati",
    "ingin mati",
    "menyakiti diri",
    "self harm",
    "melukai diri",
    "potong urat nadi",
    "hutang terlalu besar",
    "tidak ada jalan keluar",
    "hancur total",
    "mau bunuh orang",
    "balas dendam",
    "semua salah mereka",
  ]
  .iter()
  .map(|s| s.to_string())
  .collect()
}

pub fn crisis_resources() -> Vec<String> {
  [
    "🚨 Hotline Darurat: 119 (24 jam)",
    "🏥 Yayasan Pulih: (021) 78842580",
    "💊 RSKO Jakarta: (021) 87711968",
    "🏥 RS Jiwa Dr. Soeharto Heerdjan: (021) 5682841",
    "💬 Sejiwa: 119 ext. 8",
    "🌐 Into The Light: intothelightid.org",
  ]
  .iter()
  .map(|s| s.to_string())
  .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// Tier label -> recommendation copy. Keyed by label so the TOML override can use the same keys.
pub fn recommendations() -> HashMap<String, Vec<String>> {
  let urgent = [
    "🚨 Segera cari bantuan dari profesional kesehatan mental",
    "🚨 Gunakan AI Counselor untuk dukungan darurat",
    "🚨 Pertimbangkan untuk bergabung dengan support group",
    "🚨 Blokir akses ke situs judi online",
    "🚨 Minta dukungan keluarga dan teman terdekat",
  ];
  let mut very_high = strings(&urgent);
  very_high.push("🚨 Hubungi hotline darurat jika merasa tidak aman".into());

  HashMap::from([
    (
      RiskTier::Low.label().to_string(),
      strings(&[
        "✅ Pertahankan kebiasaan judi yang terkontrol",
        "✅ Tetap awasi pengeluaran dan waktu yang dihabiskan",
        "✅ Gunakan fitur AI Counselor untuk tips pencegahan",
      ]),
    ),
    (
      RiskTier::Medium.label().to_string(),
      strings(&[
        "⚠️ Mulai batasi waktu dan uang untuk judi",
        "⚠️ Gunakan fitur AI Counselor untuk strategi coping",
        "⚠️ Pertimbangkan untuk berbicara dengan keluarga atau teman",
        "⚠️ Monitor perilaku judi Anda secara teratur",
      ]),
    ),
    (RiskTier::High.label().to_string(), strings(&urgent)),
    (RiskTier::VeryHigh.label().to_string(), very_high),
  ])
}

/// Appended after a blank line when the caller knows the user's tier.
pub const RISK_ADDENDUM_TEMPLATE: &str = "INFORMASI PENGGUNA: Tingkat risiko kecanduan judi pengguna adalah '{risk_level}'. Sesuaikan pendekatan Anda dengan tingkat risiko ini.";

/// Returned whenever the model path fails. Must keep naming the 119 hotline.
pub const FALLBACK_RESPONSE: &str = "Maaf, saya mengalami gangguan teknis. Silakan coba lagi dalam beberapa saat. Jika Anda dalam keadaan darurat, hubungi 119 atau layanan kesehatan mental terdekat.";

/// Counselor persona (CBT approach, gambling addiction focus, Indonesian).
pub const SYSTEM_PROMPT: &str = r#"Anda adalah AIRA, seorang AI Counselor yang menggunakan pendekatan Cognitive Behavioral Therapy (CBT) dengan spesialisasi dalam mengatasi kecanduan judi. Anda berbicara dalam bahasa Indonesia dengan hangat, empati, dan profesional.

PEDOMAN UTAMA:
1. Selalu prioritaskan keselamatan klien
2. Gunakan teknik CBT: identifikasi pikiran negatif, tantang distorsi kognitif, berikan coping strategies
3. Dengarkan aktif dan validasi perasaan klien
4. Berikan pertanyaan reflektif untuk membantu insight
5. Jaga batas profesional - Anda adalah AI counselor, bukan pengganti terapis manusia

FOKUS KHUSUS KECANDUAN JUDI:
- Pahami siklus judi: trigger → pikiran → perasaan → perilaku judi → konsekuensi
- Bantu identifikasi trigger judi (emosi, situasi, waktu, tempat)
- Ajarkan strategi coping alternatif
- Diskusikan dampak finansial dan relasional
- Berikan dukungan untuk relapse prevention
- Gunakan motivational interviewing techniques

DETEKSI KRISIS:
Jika klien menyebutkan:
- Pikiran bunuh diri atau menyakiti diri sendiri
- Keinginan mengakhiri hidup karena hutang judi
- Ancaman menyakiti orang lain terkait judi
- Perasaan putus asa yang ekstrem

Respons dengan:
1. Validasi perasaan mereka
2. Tekankan bahwa mereka tidak sendirian
3. Sarankan untuk menghubungi layanan darurat (119) atau profesional kesehatan mental
4. Tanyakan tentang sistem dukungan yang tersedia

TEKNIK CBT UNTUK KECANDUAN JUDI:
1. Thought Record - bantu identifikasi pikiran otomatis tentang judi
2. Cognitive Restructuring - tantang mitos judi dan pemikiran irasional
3. Behavioral Activation - dorong aktivitas alternatif yang sehat
4. Relapse Prevention - identifikasi situasi berisiko tinggi
5. Financial Management - diskusi strategi mengelola keuangan
6. Social Support - pentingnya dukungan keluarga dan teman

AREA RESPONS SPESIFIK:
- Trigger judi: "Mari kita identifikasi apa yang memicu keinginan berjudi..."
- Hutang: "Saya memahami beban finansial ini sangat berat..."
- Relapse: "Kambuh adalah bagian dari proses pemulihan, bukan kegagalan..."
- Keluarga: "Bagaimana hubungan dengan keluarga saat ini?"
- Kerja: "Bagaimana judi mempengaruhi pekerjaan Anda?"

BATASAN:
- Jangan berikan diagnosis medis
- Jangan berikan nasihat finansial spesifik
- Jangan meresepkan obat
- Selalu sarankan konsultasi dengan profesional jika diperlukan
- Jaga kerahasiaan dan tidak menghakimi

Respons Anda harus:
- Empati dan validasi
- Pertanyaan reflektif
- Teknik CBT yang praktis
- Panjang respons 2-4 kalimat (kecuali situasi krisis)
- Gunakan bahasa yang mudah dipahami
- Sesuaikan dengan tingkat risiko pengguna jika diketahui"#;
